//! Input validation primitives shared by the action layer.

use crate::error::FieldErrors;

/// Loose email shape check: one `@`, non-empty local part, dotted
/// domain, no whitespace. Deliverability is the mail server's problem.
pub fn is_valid_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn add_field_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_owned())
        .or_default()
        .push(message.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        for email in ["ada@example.com", "a.b+tag@sub.example.org"] {
            assert!(is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "ada", "@example.com", "ada@", "ada@example", "a b@example.com", "a@@example.com"] {
            assert!(!is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn field_errors_accumulate_in_order() {
        let mut errors = FieldErrors::new();
        add_field_error(&mut errors, "name", "too short");
        add_field_error(&mut errors, "name", "looks odd");
        assert_eq!(errors["name"], vec!["too short", "looks odd"]);
    }
}
