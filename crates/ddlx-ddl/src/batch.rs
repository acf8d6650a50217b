/// An ordered list of statements that together make one schema change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBatch {
    pub statements: Vec<String>,
}

impl StatementBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(sql: impl Into<String>) -> Self {
        Self {
            statements: vec![sql.into()],
        }
    }

    pub fn push(&mut self, sql: impl Into<String>) {
        self.statements.push(sql.into());
    }

    pub fn merge(&mut self, other: StatementBatch) {
        self.statements.extend(other.statements);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }

    /// Statements joined into one `;`-terminated script
    pub fn script(&self) -> String {
        self.statements.join(";\n") + if self.statements.is_empty() { "" } else { ";" }
    }
}

impl IntoIterator for StatementBatch {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_terminates_each_statement() {
        let mut batch = StatementBatch::single("ALTER TABLE t ADD COLUMN c INTEGER");
        batch.push("UPDATE t SET c = 0");
        assert_eq!(
            batch.script(),
            "ALTER TABLE t ADD COLUMN c INTEGER;\nUPDATE t SET c = 0;"
        );
        assert_eq!(StatementBatch::new().script(), "");
    }
}
