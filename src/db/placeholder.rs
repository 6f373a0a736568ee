//! Placeholder syntax translation.
//!
//! Statements are written with `@name` placeholders. Drivers that only
//! understand `:name` get the text rewritten here. Only tokens naming a
//! bound parameter are touched; MySQL user variables (`@counter`),
//! system variables (`@@autocommit`) and anything inside quotes pass
//! through unchanged.

use super::value::Parameters;

/// A statement after placeholder rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Statement text with `:name` placeholders.
    pub sql: String,
    /// Bare names of the parameters the statement uses, in first-use order.
    pub names: Vec<String>,
}

/// Rewrite `@name` into `:name` for every bound parameter `name`.
///
/// Parameters the statement never mentions are left out of
/// [`Rewritten::names`].
///
/// # Example
/// ```
/// use dispatchsql::db::placeholder::to_colon_placeholders;
/// use dispatchsql::Parameters;
///
/// let params = Parameters::new().with("id", 1).with("unused", 2);
/// let rewritten = to_colon_placeholders("SELECT @id, '@id', @other, @id", &params);
///
/// assert_eq!(rewritten.sql, "SELECT :id, '@id', @other, :id");
/// assert_eq!(rewritten.names, ["id"]);
/// ```
pub fn to_colon_placeholders(sql: &str, params: &Parameters) -> Rewritten {
    let mut names: Vec<String> = Vec::new();
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' && q != '`' {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '@' if matches!(chars.peek(), Some((_, '@'))) => {
                // System variable: copy both sigils and the name untouched.
                out.push('@');
                out.push('@');
                chars.next();
                while let Some(&(_, n)) = chars.peek() {
                    if !is_ident_char(n) {
                        break;
                    }
                    out.push(n);
                    chars.next();
                }
            }
            '@' => {
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, n)) = chars.peek() {
                    if !is_ident_char(n) {
                        break;
                    }
                    end = j + n.len_utf8();
                    chars.next();
                }
                let token = &sql[i..end];
                if end > start && params.get(token).is_some() {
                    let name = &sql[start..end];
                    out.push(':');
                    out.push_str(name);
                    if !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                } else {
                    out.push_str(token);
                }
            }
            _ => out.push(c),
        }
    }

    Rewritten { sql: out, names }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
