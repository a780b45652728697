use crate::domain::todo::TodoInput;
use super::types::TodoRequest;

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 255;

pub fn validate_request(request: TodoRequest) -> Result<TodoInput, Vec<String>> {
    let mut errors = Vec::new();

    let title = match request.title {
        Some(title) if !title.trim().is_empty() => {
            if title.chars().count() > TITLE_MAX_CHARS {
                errors.push(format!("title: size must be at most {TITLE_MAX_CHARS} characters"));
            }
            Some(title)
        }
        _ => {
            errors.push("title: must not be blank".to_string());
            None
        }
    };

    if let Some(description) = &request.description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(format!("description: size must be at most {DESCRIPTION_MAX_CHARS} characters"));
        }
    }

    match title {
        Some(title) if errors.is_empty() => Ok(TodoInput {
            title,
            description: request.description,
            completed: request.completed,
        }),
        _ => Err(errors),
    }
}

// absent or empty means no filter
pub fn parse_completed_flag(raw: Option<&str>) -> Result<Option<bool>, Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(_) => Err(vec!["completed: must be true or false".to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: Option<&str>, description: Option<&str>, completed: Option<bool>) -> TodoRequest {
        TodoRequest { title: title.map(Into::into), description: description.map(Into::into), completed }
    }

    #[test]
    fn accepts_title_verbatim() {
        let input = validate_request(request(Some(" Buy milk "), Some("2l"), None)).unwrap();
        assert_eq!(input.title, " Buy milk ");
        assert_eq!(input.description.as_deref(), Some("2l"));
        assert_eq!(input.completed, None);
    }

    #[test]
    fn rejects_missing_empty_and_whitespace_titles() {
        for title in [None, Some(""), Some("   \t")] {
            let errors = validate_request(request(title, None, Some(true))).unwrap_err();
            assert_eq!(errors, vec!["title: must not be blank".to_string()]);
        }
    }

    #[test]
    fn collects_every_violation() {
        let long = "x".repeat(DESCRIPTION_MAX_CHARS + 1);
        let errors = validate_request(request(Some(""), Some(&long), None)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("title:"));
        assert!(errors[1].starts_with("description:"));
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(validate_request(request(Some(&title), None, None)).is_ok());
        let title = "é".repeat(TITLE_MAX_CHARS + 1);
        assert!(validate_request(request(Some(&title), None, None)).is_err());
    }

    #[test]
    fn completed_flag_parsing() {
        assert_eq!(parse_completed_flag(None), Ok(None));
        assert_eq!(parse_completed_flag(Some("")), Ok(None));
        assert_eq!(parse_completed_flag(Some("true")), Ok(Some(true)));
        assert_eq!(parse_completed_flag(Some("FALSE")), Ok(Some(false)));
        assert!(parse_completed_flag(Some("yes")).is_err());
    }
}
