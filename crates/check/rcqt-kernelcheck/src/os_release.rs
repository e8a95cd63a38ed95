//! `/etc/os-release` scanning.

/// Key searched for, compared case-insensitively as a substring of the line.
const PRETTY_NAME: &str = "pretty_name";

/// Yields every line that mentions `pretty_name`, in file order.
pub fn pretty_name_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .filter(|line| line.to_ascii_lowercase().contains(PRETTY_NAME))
}

/// Extracts the value of a `KEY=value` line.
///
/// One pair of surrounding double or single quotes is removed. A line
/// without `=` has no value.
#[must_use]
pub fn line_value(line: &str) -> &str {
    let Some((_, value)) = line.split_once('=') else {
        return "";
    };

    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        })
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBUNTU: &str = r#"NAME="Ubuntu"
VERSION="18.04.1 LTS (Bionic Beaver)"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME="Ubuntu 18.04.1 LTS"
VERSION_ID="18.04"
HOME_URL="https://www.ubuntu.com/"
"#;

    #[test]
    fn finds_pretty_name() {
        let lines: Vec<_> = pretty_name_lines(UBUNTU).collect();
        assert_eq!(lines, [r#"PRETTY_NAME="Ubuntu 18.04.1 LTS""#]);
        assert_eq!(line_value(lines[0]), "Ubuntu 18.04.1 LTS");
    }

    #[test]
    fn match_is_case_insensitive() {
        let text = "pretty_name=\"Fedora 39\"\nPretty_Name='Arch Linux'\n";
        let values: Vec<_> = pretty_name_lines(text).map(line_value).collect();
        assert_eq!(values, ["Fedora 39", "Arch Linux"]);
    }

    #[test]
    fn unquoted_and_odd_values() {
        assert_eq!(line_value("PRETTY_NAME=Debian"), "Debian");
        assert_eq!(line_value("PRETTY_NAME=\"\""), "");
        assert_eq!(line_value("PRETTY_NAME=\"half"), "\"half");
        assert_eq!(line_value("PRETTY_NAME=\"a=b\""), "a=b");
        assert_eq!(line_value("# no pretty_name here"), "");
    }

    #[test]
    fn crlf_lines() {
        let text = "ID=rhel\r\nPRETTY_NAME=\"Red Hat Enterprise Linux 8.6\"\r\n";
        let values: Vec<_> = pretty_name_lines(text).map(line_value).collect();
        assert_eq!(values, ["Red Hat Enterprise Linux 8.6"]);
    }

    #[test]
    fn no_pretty_name() {
        assert_eq!(pretty_name_lines("NAME=\"Alpine\"\nID=alpine\n").count(), 0);
    }
}
