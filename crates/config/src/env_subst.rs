/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders in raw config text.
///
/// Unset variables without a fallback are left as-is. A variable set to the
/// empty string expands to nothing unless a fallback is given.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Placeholder expansion with an injectable lookup, so tests never touch the
/// process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder verbatim.
            result.push_str(&rest[start..]);
            return result;
        };

        let inner = &after[..end];
        let (name, fallback) = match inner.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (inner, None),
        };

        let resolved = if name.is_empty() {
            None
        } else {
            match (lookup(name), fallback) {
                (Some(value), Some(fallback)) if value.is_empty() => Some(fallback.to_string()),
                (Some(value), _) => Some(value),
                (None, fallback) => fallback.map(str::to_string),
            }
        };

        match resolved {
            Some(value) => result.push_str(&value),
            None => {
                result.push_str("${");
                result.push_str(inner);
                result.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "SKILLDECK_TEST_VAR" => Some("hello".to_string()),
            "SKILLDECK_EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_env_with("key=${SKILLDECK_TEST_VAR}", lookup),
            "key=hello"
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("${SKILLDECK_NONEXISTENT_XYZ}", lookup),
            "${SKILLDECK_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn uses_fallback_for_unknown_or_empty() {
        assert_eq!(
            substitute_env_with("limit = ${SKILLDECK_LIMIT:-5}", lookup),
            "limit = 5"
        );
        assert_eq!(substitute_env_with("${SKILLDECK_EMPTY:-x}", lookup), "x");
        assert_eq!(
            substitute_env_with("${SKILLDECK_TEST_VAR:-x}", lookup),
            "hello"
        );
    }

    #[test]
    fn empty_var_without_fallback_expands_to_nothing() {
        assert_eq!(
            substitute_env_with("token = \"${SKILLDECK_EMPTY}\"", lookup),
            "token = \"\""
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env_with("a ${OPEN", lookup), "a ${OPEN");
        assert_eq!(substitute_env_with("${}", lookup), "${}");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
