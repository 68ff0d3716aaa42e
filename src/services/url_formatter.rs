use crate::domain::{
    models::{Bucket, Object, UrlRecord},
    value_objects::UrlTemplate,
};

/// Entities that can be rendered through a [`UrlTemplate`]
pub trait ToUrl {
    fn to_url(&self, template: &UrlTemplate) -> String;
}

impl ToUrl for Bucket {
    fn to_url(&self, template: &UrlTemplate) -> String {
        template.render(&self.region, &self.name, None)
    }
}

impl ToUrl for Object {
    fn to_url(&self, template: &UrlTemplate) -> String {
        template.render(&self.bucket.region, &self.bucket.name, Some(&self.full_key()))
    }
}

/// Renders buckets and objects as urls
#[derive(Debug, Clone)]
pub struct UrlFormatter {
    object_template: UrlTemplate,
    bucket_template: UrlTemplate,
}

impl Default for UrlFormatter {
    fn default() -> Self {
        Self::new(UrlTemplate::default_object(), UrlTemplate::default_bucket())
    }
}

impl UrlFormatter {
    pub fn new(object_template: UrlTemplate, bucket_template: UrlTemplate) -> Self {
        Self {
            object_template,
            bucket_template,
        }
    }

    pub fn with_object_template(mut self, template: UrlTemplate) -> Self {
        self.object_template = template;
        self
    }

    pub fn with_bucket_template(mut self, template: UrlTemplate) -> Self {
        self.bucket_template = template;
        self
    }

    pub fn object_url(&self, object: &Object) -> String {
        object.to_url(&self.object_template)
    }

    pub fn bucket_url(&self, bucket: &Bucket) -> String {
        bucket.to_url(&self.bucket_template)
    }

    /// One record per object, in the order given
    pub fn url_records(&self, objects: &[Object]) -> Vec<UrlRecord> {
        objects
            .iter()
            .map(|object| UrlRecord {
                url: self.object_url(object),
                date: object.modified,
                size: object.size,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Placeholder;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn bucket() -> Arc<Bucket> {
        Arc::new(Bucket::new(
            "bkt",
            "us-east-1",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_default_templates() {
        let formatter = UrlFormatter::default();
        let object = Object::new(
            bucket(),
            "a/b.txt",
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            3,
        );

        assert_eq!(
            formatter.object_url(&object),
            "http://s3.us-east-1.amazonaws.com/bkt/a/b.txt"
        );
        assert_eq!(
            formatter.bucket_url(&bucket()),
            "http://s3.us-east-1.amazonaws.com/bkt"
        );
    }

    #[test]
    fn test_custom_template_and_records() {
        let template = UrlTemplate::parse(
            "s3://{bucket_name}/{object_full_path}",
            &[Placeholder::BucketName, Placeholder::ObjectFullPath],
        )
        .unwrap();
        let formatter = UrlFormatter::default().with_object_template(template);
        let modified = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let object = Object::new(bucket(), "logs/app.log", modified, 42);

        let records = formatter.url_records(&[object]);

        assert_eq!(
            records,
            vec![UrlRecord {
                url: "s3://bkt/logs/app.log".to_string(),
                date: modified,
                size: 42,
            }]
        );
    }
}
