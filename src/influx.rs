use anyhow::{bail, Context, Result};
use chrono::Utc;
use reqwest::{header, Client, Url};

use crate::config::InfluxConfig;
use crate::stats::DslStats;

const MEASUREMENT: &str = "dsl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The backend accepted this line.
    Written { line: String },
    /// Every statistic was empty, so no request was made.
    Skipped,
}

/// Posts points to the InfluxDB v2 write API.
pub struct InfluxWriter {
    client: Client,
    endpoint: Url,
    token: String,
    location: String,
}

impl InfluxWriter {
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let base = config.uri.trim_end_matches('/');
        let endpoint = Url::parse_with_params(
            &format!("{base}/api/v2/write"),
            &[
                ("org", config.org.as_str()),
                ("bucket", config.bucket.as_str()),
                ("precision", "ns"),
            ],
        )
        .with_context(|| format!("invalid InfluxDB uri '{}'", config.uri))?;
        let client = Client::builder()
            .build()
            .context("failed to build InfluxDB HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            token: config.token.clone(),
            location: config.location.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Writes the stats stamped with the current time.
    pub async fn write(&self, stats: &DslStats) -> Result<WriteOutcome> {
        let timestamp_ns = Utc::now()
            .timestamp_nanos_opt()
            .context("system clock is outside the nanosecond timestamp range")?;
        self.write_at(stats, timestamp_ns).await
    }

    pub async fn write_at(&self, stats: &DslStats, timestamp_ns: i64) -> Result<WriteOutcome> {
        let Some(line) = line_protocol(&self.location, stats, timestamp_ns) else {
            tracing::info!(location = %self.location, "no fields to send");
            return Ok(WriteOutcome::Skipped);
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::AUTHORIZATION, format!("Token {}", self.token))
            .body(line.clone())
            .send()
            .await
            .with_context(|| format!("write request to {} failed", self.endpoint))?;
        let status = response.status();
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            bail!("write rejected with {status}: {}", body.trim());
        }

        tracing::info!(line = %line, "point written");
        Ok(WriteOutcome::Written { line })
    }
}

/// Formats one point:
/// `dsl,location=<location> <Name>=<value>,... <timestamp_ns>`.
///
/// Empty statistics are left out; `None` means nothing was reported at all.
pub fn line_protocol(location: &str, stats: &DslStats, timestamp_ns: i64) -> Option<String> {
    let fields: Vec<String> = stats
        .reported()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if fields.is_empty() {
        return None;
    }
    Some(format!(
        "{MEASUREMENT},location={} {} {timestamp_ns}",
        escape_tag(location),
        fields.join(",")
    ))
}

fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn influx_config(uri: String) -> InfluxConfig {
        InfluxConfig {
            uri,
            token: "tok3n".into(),
            bucket: "bucket1".into(),
            org: "org1".into(),
            location: "siteA".into(),
        }
    }

    fn sample_stats() -> DslStats {
        DslStats {
            down: "10".into(),
            up: "2".into(),
            link_uptime: "3723".into(),
            ..Default::default()
        }
    }

    #[test]
    fn formats_line_protocol_in_field_order() {
        let line = line_protocol("siteA", &sample_stats(), 1_700_000_000_000_000_000);
        assert_eq!(
            line.as_deref(),
            Some("dsl,location=siteA Down=10,Up=2,LinkUptime=3723 1700000000000000000")
        );
    }

    #[test]
    fn empty_fields_never_appear() {
        let stats = DslStats {
            retrains: String::new(),
            crc_near_end: "301".into(),
            ..sample_stats()
        };
        let line = line_protocol("siteA", &stats, 1).expect("line");
        assert!(!line.contains("Retrains"));
        assert!(!line.contains("SNRDown"));
        assert!(line.contains("LinkUptime=3723,CRCNearEnd=301 1"));
    }

    #[test]
    fn all_empty_stats_produce_no_line() {
        assert_eq!(line_protocol("siteA", &DslStats::default(), 1), None);
    }

    #[test]
    fn location_tag_is_escaped() {
        let line = line_protocol("attic, rack=2", &sample_stats(), 1).expect("line");
        assert!(line.starts_with("dsl,location=attic\\,\\ rack\\=2 Down=10"));
    }

    #[test]
    fn endpoint_carries_org_bucket_and_precision() {
        let writer = InfluxWriter::new(&influx_config("http://influx:8086/".into()))
            .expect("writer");
        assert_eq!(
            writer.endpoint().as_str(),
            "http://influx:8086/api/v2/write?org=org1&bucket=bucket1&precision=ns"
        );
    }

    #[tokio::test]
    async fn writes_line_with_token_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("org".into(), "org1".into()),
                Matcher::UrlEncoded("bucket".into(), "bucket1".into()),
                Matcher::UrlEncoded("precision".into(), "ns".into()),
            ]))
            .match_header("authorization", "Token tok3n")
            .match_body("dsl,location=siteA Down=10,Up=2,LinkUptime=3723 42")
            .with_status(204)
            .create_async()
            .await;

        let writer = InfluxWriter::new(&influx_config(server.url())).expect("writer");
        let outcome = writer.write_at(&sample_stats(), 42).await.expect("write");

        assert_eq!(
            outcome,
            WriteOutcome::Written {
                line: "dsl,location=siteA Down=10,Up=2,LinkUptime=3723 42".into()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn write_uses_current_time() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .match_body(Matcher::Regex(
                r"^dsl,location=siteA Down=10,Up=2,LinkUptime=3723 \d{19}$".into(),
            ))
            .with_status(204)
            .create_async()
            .await;

        let writer = InfluxWriter::new(&influx_config(server.url())).expect("writer");
        writer.write(&sample_stats()).await.expect("write");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn skips_request_when_nothing_reported() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let writer = InfluxWriter::new(&influx_config(server.url())).expect("writer");
        let outcome = writer.write(&DslStats::default()).await.expect("write");

        assert_eq!(outcome, WriteOutcome::Skipped);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_write_reports_status_and_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"code":"unauthorized"}"#)
            .create_async()
            .await;

        let writer = InfluxWriter::new(&influx_config(server.url())).expect("writer");
        let err = writer.write_at(&sample_stats(), 1).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("unauthorized"), "{message}");
    }
}
