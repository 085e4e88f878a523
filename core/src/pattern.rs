use regex::Regex;

/// Compiles a regex matching `token` literally, as a whole token.
///
/// The literal must be preceded and followed by a word boundary, a non-word
/// character or the edge of the line, so `id` matches `(id)` or `id,` but not
/// `identifier`, and `main()` matches at the end of `int main()`.
pub fn token_regex(token: &str) -> Result<Regex, regex::Error> {
    Regex::new(&token_pattern(token))
}

pub fn token_pattern(token: &str) -> String {
    format!(r"(^|\b|\W){}(\b|\W|$)", regex::escape(token))
}
