//! SQL script splitting

/// Outcome of running a script with error tolerance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub executed: usize,
    pub failed: usize,
}

impl ScriptSummary {
    pub fn total(&self) -> usize {
        self.executed + self.failed
    }
}

/// Split a script into statements.
///
/// A statement ends at a line whose last character is `;`. Blank lines and
/// lines starting with `--` or `//` are skipped. Trailing text without a
/// terminator is returned as a final statement.
pub fn split_script(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("--") || line.starts_with("//") {
            continue;
        }
        if let Some(body) = line.strip_suffix(';') {
            current.push_str(body);
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        } else {
            current.push_str(line);
            current.push(' ');
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        statements.push(rest.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_multiline_statements_and_skip_comments() {
        let script = "-- schema for hosts\n\
                      CREATE TABLE hosts (\n  host_id INTEGER,\n  host_name VARCHAR(255)\n);\n\
                      \n\
                      // seed\n\
                      INSERT INTO hosts (host_id, host_name) VALUES (1, 'c6401');\n\
                      DELETE FROM hosts";
        assert_eq!(
            split_script(script),
            vec![
                "CREATE TABLE hosts ( host_id INTEGER, host_name VARCHAR(255) )".to_string(),
                "INSERT INTO hosts (host_id, host_name) VALUES (1, 'c6401')".to_string(),
                "DELETE FROM hosts".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_statements_are_dropped() {
        assert!(split_script(";\n  ;\n-- nothing\n").is_empty());
    }
}
