use super::{key_for_latest, ObjectStore};
use crate::error::{Error, Result};
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::MetadataDirective;
use aws_sdk_s3::Client;
use std::fs;
use std::path::Path;
use tokio::runtime::Runtime;

pub const DEFAULT_REGION: &str = "us-west-2";

/// S3 bucket store. Calls run to completion on a private current-thread runtime.
pub struct S3Store {
    client: Client,
    runtime: Runtime,
    bucket: String,
    prefix: String,
}

impl S3Store {
    /// Loads credentials from the standard AWS chain (env, profile, instance role).
    pub fn connect(bucket: &str, prefix: &str, region: Option<&str>) -> Result<Self> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(Error::Configuration("storage.bucket is required".into()));
        }
        let region = region
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_string();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::io("start storage runtime", err))?;
        let sdk_config = runtime.block_on(
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .load(),
        );
        tracing::debug!(bucket, %region, "connected to s3");

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn put(&self, key: &str, body: Vec<u8>, content_type: &str, cache_control: &str) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body));
        if !content_type.is_empty() {
            request = request.content_type(content_type);
        }
        if !cache_control.is_empty() {
            request = request.cache_control(cache_control);
        }
        self.runtime
            .block_on(request.send())
            .map_err(|err| Error::upload(key, DisplayErrorContext(&err)))?;
        Ok(())
    }
}

impl ObjectStore for S3Store {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn upload_file(&self, key: &str, local: &Path, content_type: &str, cache_control: &str) -> Result<()> {
        let data = fs::read(local)
            .map_err(|err| Error::upload(key, format!("read {}: {err}", local.display())))?;
        self.put(key, data, content_type, cache_control)
    }

    fn copy_to_latest(&self, src_key: &str, filename: &str, content_type: &str, cache_control: &str) -> Result<()> {
        let latest = key_for_latest(&self.prefix, filename);
        let mut request = self
            .client
            .copy_object()
            .bucket(&self.bucket)
            .key(&latest)
            .copy_source(copy_source(&self.bucket, src_key)?);
        if !content_type.is_empty() {
            request = request.content_type(content_type);
        }
        if !cache_control.is_empty() {
            request = request.cache_control(cache_control);
        }
        if !content_type.is_empty() || !cache_control.is_empty() {
            request = request.metadata_directive(MetadataDirective::Replace);
        }
        self.runtime
            .block_on(request.send())
            .map_err(|err| Error::upload(&latest, DisplayErrorContext(&err)))?;
        Ok(())
    }

    fn download_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let request = self.client.get_object().bucket(&self.bucket).key(key);
        let output = match self.runtime.block_on(request.send()) {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Ok(None)
            }
            Err(err) => return Err(Error::upload(key, DisplayErrorContext(&err))),
        };
        let body = self
            .runtime
            .block_on(output.body.collect())
            .map_err(|err| Error::upload(key, err))?;
        Ok(Some(body.into_bytes().to_vec()))
    }

    fn upload_bytes(&self, key: &str, data: &[u8], content_type: &str, cache_control: &str) -> Result<()> {
        self.put(key, data.to_vec(), content_type, cache_control)
    }
}

/// `<bucket>/<key>` with each key segment percent-encoded.
pub fn copy_source(bucket: &str, key: &str) -> Result<String> {
    let mut url = url::Url::parse("s3://copy-source").map_err(|err| Error::upload(key, err))?;
    url.path_segments_mut()
        .map_err(|_| Error::upload(key, "cannot encode copy source"))?
        .clear()
        .extend(key.split('/'));
    Ok(format!("{bucket}{}", url.path()))
}
