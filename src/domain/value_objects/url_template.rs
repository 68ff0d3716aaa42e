use crate::domain::errors::ValidationError;

pub const DEFAULT_OBJECT_URL_TEMPLATE: &str =
    "http://s3.{region}.amazonaws.com/{bucket_name}/{object_full_path}";
pub const DEFAULT_BUCKET_URL_TEMPLATE: &str = "http://s3.{region}.amazonaws.com/{bucket_name}";

/// Named placeholders a url template can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Region,
    BucketName,
    ObjectFullPath,
}

impl Placeholder {
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Region => "{region}",
            Placeholder::BucketName => "{bucket_name}",
            Placeholder::ObjectFullPath => "{object_full_path}",
        }
    }

    /// `{name}` is the older spelling of `{bucket_name}`
    fn is_present_in(&self, template: &str) -> bool {
        match self {
            Placeholder::BucketName => {
                template.contains(self.token()) || template.contains(LEGACY_BUCKET_TOKEN)
            }
            _ => template.contains(self.token()),
        }
    }
}

const LEGACY_BUCKET_TOKEN: &str = "{name}";

/// A url template with `{region}`, `{bucket_name}` and `{object_full_path}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    /// Wrap a template without checking its placeholders
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Wrap a template, rejecting it unless every required placeholder is present
    pub fn parse(
        template: impl Into<String>,
        required: &[Placeholder],
    ) -> Result<Self, ValidationError> {
        let template = template.into();
        let missing = Self::missing(&template, required);
        if !missing.is_empty() {
            return Err(ValidationError::InvalidTemplate {
                template,
                missing: missing.iter().map(|p| p.token().to_string()).collect(),
            });
        }
        Ok(Self(template))
    }

    /// True iff every required placeholder appears in the template
    pub fn validate(template: &str, required: &[Placeholder]) -> bool {
        Self::missing(template, required).is_empty()
    }

    fn missing(template: &str, required: &[Placeholder]) -> Vec<Placeholder> {
        required
            .iter()
            .filter(|p| !p.is_present_in(template))
            .copied()
            .collect()
    }

    pub fn default_object() -> Self {
        Self::new(DEFAULT_OBJECT_URL_TEMPLATE)
    }

    pub fn default_bucket() -> Self {
        Self::new(DEFAULT_BUCKET_URL_TEMPLATE)
    }

    /// Substitute placeholders; a `None` path renders `{object_full_path}` as empty
    pub fn render(&self, region: &str, bucket_name: &str, object_full_path: Option<&str>) -> String {
        self.0
            .replace(Placeholder::Region.token(), region)
            .replace(Placeholder::BucketName.token(), bucket_name)
            .replace(LEGACY_BUCKET_TOKEN, bucket_name)
            .replace(
                Placeholder::ObjectFullPath.token(),
                object_full_path.unwrap_or_default(),
            )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Help text describing the supported placeholders
    pub fn help() -> String {
        format!(
            "url template using placeholders {{region}}, {{bucket_name}} and {{object_full_path}} \
             (e.g. s3://{{bucket_name}}/{{object_full_path}}). Default: {}",
            DEFAULT_OBJECT_URL_TEMPLATE
        )
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self::default_object()
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT_PLACEHOLDERS: &[Placeholder] = &[
        Placeholder::Region,
        Placeholder::BucketName,
        Placeholder::ObjectFullPath,
    ];

    #[test]
    fn test_validate_is_true_when_placeholders_present() {
        assert!(UrlTemplate::validate(
            DEFAULT_OBJECT_URL_TEMPLATE,
            OBJECT_PLACEHOLDERS
        ));
        assert!(!UrlTemplate::validate(
            "http://s3.amazonaws.com/{bucket_name}",
            OBJECT_PLACEHOLDERS
        ));
        assert!(UrlTemplate::validate("anything", &[]));
    }

    #[test]
    fn test_legacy_name_placeholder_counts_as_bucket_name() {
        assert!(UrlTemplate::validate(
            "http://s3.{region}.amazonaws.com/{name}",
            &[Placeholder::Region, Placeholder::BucketName]
        ));

        let template = UrlTemplate::new("https://{name}.s3.amazonaws.com");
        assert_eq!(
            template.render("eu-west-1", "bkt", None),
            "https://bkt.s3.amazonaws.com"
        );
    }

    #[test]
    fn test_parse_reports_missing_placeholders() {
        let err = UrlTemplate::parse("s3://{bucket_name}", OBJECT_PLACEHOLDERS).unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidTemplate {
                template: "s3://{bucket_name}".to_string(),
                missing: vec!["{region}".to_string(), "{object_full_path}".to_string()],
            }
        );
    }

    #[test]
    fn test_render_default_templates() {
        assert_eq!(
            UrlTemplate::default_object().render("us-east-1", "bkt", Some("a/b.txt")),
            "http://s3.us-east-1.amazonaws.com/bkt/a/b.txt"
        );
        assert_eq!(
            UrlTemplate::default_bucket().render("us-east-1", "bkt", None),
            "http://s3.us-east-1.amazonaws.com/bkt"
        );
    }
}
