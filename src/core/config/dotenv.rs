// ─── .env Loading ───
// KEY=VALUE lines merged into the process environment before argument parsing.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::{UpdaterError, UpdaterResult};

/// Parse `.env` text. Blank lines and `#` comments are skipped, one pair of
/// surrounding quotes is stripped, and an unquoted value loses a trailing
/// `# comment`.
pub fn parse(contents: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let mut value = value.trim();
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));

        if quoted {
            value = &value[1..value.len() - 1];
        } else if let Some((before, _)) = value.split_once('#') {
            value = before.trim();
        }

        if !key.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }

    vars
}

/// Merge `path` into the environment and return how many variables were
/// set. Variables already set win; a missing file sets nothing.
/// Must run before any other thread is spawned.
pub fn load(path: &Path) -> UpdaterResult<usize> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(UpdaterError::io(path, e)),
    };

    let mut applied = 0;
    for (key, value) in parse(&contents) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quotes_and_comments() {
        let vars = parse(
            "# credentials\n\
             CURSEFORGE_API_KEY=\"$2a$10$abc#def\"\n\
             PLAIN = value # trailing\n\
             SINGLE='x y'\n\
             not a pair\n\
             EMPTY=\n",
        );
        assert_eq!(vars["CURSEFORGE_API_KEY"], "$2a$10$abc#def");
        assert_eq!(vars["PLAIN"], "value");
        assert_eq!(vars["SINGLE"], "x y");
        assert_eq!(vars["EMPTY"], "");
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(&dir.path().join(".env")).unwrap(), 0);
    }

    #[test]
    fn unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be read as a file
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, UpdaterError::Io { .. }));
    }

    #[test]
    fn existing_environment_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "MCSU_DOTENV_TEST_SET=from-file\nMCSU_DOTENV_TEST_NEW=fresh\n",
        )
        .unwrap();
        std::env::set_var("MCSU_DOTENV_TEST_SET", "from-env");

        assert_eq!(load(&path).unwrap(), 1);

        assert_eq!(std::env::var("MCSU_DOTENV_TEST_SET").unwrap(), "from-env");
        assert_eq!(std::env::var("MCSU_DOTENV_TEST_NEW").unwrap(), "fresh");
    }
}
