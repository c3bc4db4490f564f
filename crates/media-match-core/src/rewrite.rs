use media_match_config::RewriteRule;
use regex::Regex;
use std::borrow::Cow;

/// Maps a PVR path onto the path the media server sees for the same file
#[derive(Debug, Clone)]
pub struct PathRewriter {
    rule: Option<(Regex, String)>,
}

impl PathRewriter {
    pub fn new(rule: &RewriteRule) -> Result<Self, regex::Error> {
        if rule.is_identity() {
            return Ok(Self::identity());
        }

        Ok(Self {
            rule: Some((Regex::new(&rule.from)?, rule.to.clone())),
        })
    }

    pub fn identity() -> Self {
        Self { rule: None }
    }

    pub fn rewrite<'a>(&self, path: &'a str) -> Cow<'a, str> {
        match &self.rule {
            Some((pattern, replacement)) => pattern.replace_all(path, replacement.as_str()),
            None => Cow::Borrowed(path),
        }
    }
}
