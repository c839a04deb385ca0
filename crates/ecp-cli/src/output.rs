//! Output rendering for portal responses.
//!
//! Responses are shown in one of three ways:
//! - raw JSON (`--json`), re-serialized with 2-space indentation in the
//!   portal's key order
//! - block-style YAML with sorted keys, for single objects and every non-`get` verb
//! - a per-kind human-readable listing when a `get` returns a list envelope
//!
//! Deployment listings need a second request per row because the status of a
//! deployment is only linked from the listing, not embedded in it.

use std::io::Write;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{PortalClient, RawResponse, Transport};
use crate::error::CliError;
use crate::resource::{ResourceKind, Verb};

/// Status cell shown when a deployment's status cannot be fetched.
pub const STATUS_ERROR: &str = "Error getting status";

/// Timestamp layout of the STARTED column.
const STARTED_FORMAT: &str = "%H:%M %d-%m-%Y";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable tables, listings and YAML.
    #[default]
    Table,
    /// Raw JSON for scripting.
    Json,
}

/// Output formatter selected on the command line.
#[derive(Debug, Clone, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Formatter for the `--json` flag.
    #[must_use]
    pub const fn from_json_flag(json: bool) -> Self {
        if json {
            Self::new(Format::Json)
        } else {
            Self::new(Format::Table)
        }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }
}

/// Trait for types that have a human-readable rendering.
pub trait TableDisplay {
    /// Write the value in its human-readable form.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Renders portal responses, issuing status lookups through `client`.
#[derive(Debug)]
pub struct Renderer<'a, T> {
    client: &'a PortalClient<T>,
    format: OutputFormat,
}

impl<'a, T: Transport> Renderer<'a, T> {
    /// Create a renderer.
    #[must_use]
    pub const fn new(client: &'a PortalClient<T>, format: OutputFormat) -> Self {
        Self { client, format }
    }

    /// Render `response` for a `verb` on `kind`.
    ///
    /// A body that is not JSON is printed verbatim. Status lookup failures are
    /// shown in the STATUS cell and never abort the listing.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization or writing fails.
    pub async fn render<W: Write>(
        &self,
        writer: &mut W,
        response: &RawResponse,
        kind: ResourceKind,
        verb: Verb,
    ) -> Result<(), CliError> {
        let value = match response.json() {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Printing undecodable response verbatim");
                writeln!(writer, "{}", response.body)?;
                return Ok(());
            }
        };

        if self.format.is_json() {
            return write_json(writer, &value);
        }

        if verb != Verb::Get {
            return write_yaml(writer, &value);
        }

        let Some(embedded) = list_envelope(&value) else {
            return write_yaml(writer, &value);
        };

        match kind {
            ResourceKind::Deployment => {
                let table = self.deployment_table(embedded.deployments).await;
                table.write_table(writer)
            }
            ResourceKind::Application => ApplicationList {
                applications: embedded.applications,
            }
            .write_table(writer),
            ResourceKind::Configuration => ConfigurationList {
                configurations: embedded.configurations,
            }
            .write_table(writer),
            ResourceKind::Credential => CredentialList {
                credentials: embedded.credentials,
            }
            .write_table(writer),
            ResourceKind::Parameter => ParameterList {
                parameters: embedded.parameters,
            }
            .write_table(writer),
            ResourceKind::Logs | ResourceKind::DestroyLogs | ResourceKind::Status => {
                write_yaml(writer, &value)
            }
        }
    }

    async fn deployment_table(&self, records: Vec<DeploymentRecord>) -> DeploymentTable {
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let status = self.lookup_status(&record).await.unwrap_or_else(|e| {
                warn!(reference = %record.reference, error = %e, "Deployment status unavailable");
                STATUS_ERROR.to_string()
            });
            rows.push(DeploymentRow {
                started: record.started_time.map(format_started).unwrap_or_default(),
                reference: record.reference,
                application_name: record.application_name,
                status,
            });
        }
        DeploymentTable { rows }
    }

    async fn lookup_status(&self, record: &DeploymentRecord) -> Result<String, CliError> {
        let href = record
            .status_href()
            .ok_or_else(|| CliError::StatusLookup("deployment has no status link".into()))?;

        let response = self
            .client
            .get(href)
            .await
            .map_err(|e| CliError::StatusLookup(e.to_string()))?;
        let value = response
            .json()
            .map_err(|e| CliError::StatusLookup(e.to_string()))?;

        value
            .get("status")
            .filter(|v| !v.is_null())
            .map(scalar_text)
            .ok_or_else(|| CliError::StatusLookup("response has no status field".into()))
    }
}

/// Collections of a list response, decoded from its `_embedded` envelope.
///
/// A collection missing from the envelope decodes as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Embedded {
    #[serde(rename = "cloudProviderParametersResourceList")]
    credentials: Vec<CredentialRecord>,
    #[serde(rename = "configurationDeploymentParametersResourceList")]
    parameters: Vec<ParameterRecord>,
    #[serde(rename = "configurationResourceList")]
    configurations: Vec<ConfigurationRecord>,
    #[serde(rename = "applicationResourceList")]
    applications: Vec<ApplicationRecord>,
    #[serde(rename = "deploymentResourceList")]
    deployments: Vec<DeploymentRecord>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(rename = "_embedded")]
    embedded: Option<Embedded>,
}

/// The list envelope of `value`, if it is a list response.
fn list_envelope(value: &Value) -> Option<Embedded> {
    match ListEnvelope::deserialize(value) {
        Ok(envelope) => envelope.embedded,
        Err(e) => {
            debug!(error = %e, "Response is not a list envelope");
            None
        }
    }
}

/// Pretty-print `value` as JSON with 2-space indentation.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, value: &Value) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Pretty-print `value` as block-style YAML, keys sorted at every level.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_yaml<W: Write>(writer: &mut W, value: &Value) -> Result<(), CliError> {
    let yaml = serde_yaml::to_string(&sorted_keys(value))
        .map_err(|e| CliError::Format(format!("YAML serialization failed: {e}")))?;
    writeln!(writer, "{yaml}")?;
    Ok(())
}

fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, v)| (key.clone(), sorted_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

/// Format epoch milliseconds as local `HH:MM DD-MM-YYYY`.
#[must_use]
pub fn format_started(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format(STARTED_FORMAT).to_string())
        .unwrap_or_default()
}

/// Write rows padded to one shared column width.
///
/// The width is the widest cell anywhere in the table plus two.
fn write_square_table<W: Write>(writer: &mut W, rows: &[Vec<String>]) -> Result<(), CliError> {
    let width = rows
        .iter()
        .flatten()
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    for row in rows {
        let line: String = row.iter().map(|cell| format!("{cell:<width$}")).collect();
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Text of a scalar JSON value; strings unquoted, null empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accept any JSON value as display text, see [`scalar_text`].
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|value| scalar_text(&value))
}

/// Accept integer or float epoch milliseconds; anything else is absent.
fn epoch_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)))
}

/// A `{key, value}` pair of a credential or parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Field {
    /// Field name.
    #[serde(deserialize_with = "text")]
    pub key: String,
    /// Field value.
    #[serde(deserialize_with = "text")]
    pub value: String,
}

/// A HAL link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Link {
    /// Target URL.
    pub href: Option<String>,
}

/// Links of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeploymentLinks {
    /// Status sub-resource.
    pub status: Option<Link>,
}

/// Deployment as listed by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentRecord {
    /// Deployment reference.
    #[serde(deserialize_with = "text")]
    pub reference: String,
    /// Name of the deployed application.
    #[serde(deserialize_with = "text")]
    pub application_name: String,
    /// Start time in epoch milliseconds.
    #[serde(deserialize_with = "epoch_millis")]
    pub started_time: Option<i64>,
    /// HAL links.
    #[serde(rename = "_links")]
    pub links: Option<DeploymentLinks>,
}

impl DeploymentRecord {
    /// Link to the status sub-resource.
    #[must_use]
    pub fn status_href(&self) -> Option<&str> {
        self.links.as_ref()?.status.as_ref()?.href.as_deref()
    }
}

/// One row of the deployment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRow {
    /// Deployment reference.
    pub reference: String,
    /// Name of the deployed application.
    pub application_name: String,
    /// Formatted start time, empty if never started.
    pub started: String,
    /// Status, or [`STATUS_ERROR`].
    pub status: String,
}

/// Deployment listing.
#[derive(Debug, Clone, Default)]
pub struct DeploymentTable {
    /// Table rows.
    pub rows: Vec<DeploymentRow>,
}

impl TableDisplay for DeploymentTable {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut rows = vec![vec![
            "REFERENCE".to_string(),
            "APP NAME".to_string(),
            "STARTED".to_string(),
            "STATUS".to_string(),
        ]];
        rows.extend(self.rows.iter().map(|r| {
            vec![
                r.reference.clone(),
                r.application_name.clone(),
                r.started.clone(),
                r.status.clone(),
            ]
        }));
        write_square_table(writer, &rows)
    }
}

/// Application as listed by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApplicationRecord {
    /// Application name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Application version.
    #[serde(deserialize_with = "text")]
    pub version: String,
}

/// Application listing.
#[derive(Debug, Clone, Default)]
pub struct ApplicationList {
    /// Applications.
    pub applications: Vec<ApplicationRecord>,
}

impl TableDisplay for ApplicationList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut rows = vec![vec!["NAME".to_string(), "VERSION".to_string()]];
        rows.extend(
            self.applications
                .iter()
                .map(|a| vec![a.name.clone(), a.version.clone()]),
        );
        write_square_table(writer, &rows)
    }
}

/// Configuration as listed by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationRecord {
    /// Configuration name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Name of the cloud provider parameters it uses.
    #[serde(deserialize_with = "text")]
    pub cloud_provider_parameters_name: String,
    /// SSH public key.
    #[serde(deserialize_with = "text")]
    pub ssh_key: String,
    /// Name of the deployment parameters it uses.
    #[serde(deserialize_with = "text")]
    pub deployment_parameters_name: String,
}

/// Configuration listing.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationList {
    /// Configurations.
    pub configurations: Vec<ConfigurationRecord>,
}

impl TableDisplay for ConfigurationList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for config in &self.configurations {
            writeln!(writer, "- {}:", config.name)?;
            writeln!(
                writer,
                "    Cloud provider parameters: {}",
                config.cloud_provider_parameters_name
            )?;
            writeln!(writer, "    SSH Public Key: {}", config.ssh_key)?;
            writeln!(writer, "    Parameters: {}", config.deployment_parameters_name)?;
        }
        Ok(())
    }
}

/// Cloud provider parameters as listed by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialRecord {
    /// Credential name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Cloud provider, e.g. `OSTACK`.
    #[serde(deserialize_with = "text")]
    pub cloud_provider: String,
    /// Provider fields in portal order.
    pub fields: Vec<Field>,
}

/// Credential listing.
#[derive(Debug, Clone, Default)]
pub struct CredentialList {
    /// Credentials.
    pub credentials: Vec<CredentialRecord>,
}

impl TableDisplay for CredentialList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for cred in &self.credentials {
            writeln!(writer, "- {}:", cred.name)?;
            writeln!(writer, "    Provider: {}", cred.cloud_provider)?;
            writeln!(writer, "    Parameters: ")?;
            write_fields(writer, &cred.fields)?;
        }
        Ok(())
    }
}

/// Deployment parameter set as listed by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParameterRecord {
    /// Parameter set name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Parameters in portal order.
    pub fields: Vec<Field>,
}

/// Parameter set listing.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    /// Parameter sets.
    pub parameters: Vec<ParameterRecord>,
}

impl TableDisplay for ParameterList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for param in &self.parameters {
            writeln!(writer, "- {}:", param.name)?;
            writeln!(writer, "    Parameters: ")?;
            write_fields(writer, &param.fields)?;
        }
        Ok(())
    }
}

fn write_fields<W: Write>(writer: &mut W, fields: &[Field]) -> Result<(), CliError> {
    for field in fields {
        writeln!(writer, "    * {}: {}", field.key, field.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::fake::FakeTransport;
    use crate::token::Token;

    const STATUS_URL: &str = "https://portal.test/deployment/TSI01/status";

    fn client(transport: FakeTransport) -> PortalClient<FakeTransport> {
        PortalClient::new(transport, Token::new("jwt"))
    }

    async fn render_with(
        client: &PortalClient<FakeTransport>,
        format: Format,
        body: &str,
        kind: ResourceKind,
        verb: Verb,
    ) -> String {
        let renderer = Renderer::new(client, OutputFormat::new(format));
        let mut buf = Vec::new();
        renderer
            .render(&mut buf, &RawResponse::new(200, body), kind, verb)
            .await
            .expect("should render");
        String::from_utf8(buf).expect("valid utf8")
    }

    fn deployment_listing(record: &Value) -> String {
        json!({ "_embedded": { "deploymentResourceList": [record] } }).to_string()
    }

    #[test]
    fn output_format_default_is_table() {
        let fmt = OutputFormat::default();
        assert!(!fmt.is_json());
        assert!(!OutputFormat::from_json_flag(false).is_json());
        assert!(OutputFormat::from_json_flag(true).is_json());
    }

    #[tokio::test]
    async fn undecodable_body_printed_verbatim() {
        let client = client(FakeTransport::new());
        let out = render_with(
            &client,
            Format::Table,
            "Deployment not found",
            ResourceKind::Deployment,
            Verb::Get,
        )
        .await;
        assert_eq!(out, "Deployment not found\n");
    }

    #[tokio::test]
    async fn json_flag_dumps_parsed_body_for_any_kind() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": { "applicationResourceList": [{ "name": "nginx", "version": "1.0" }] } });
        let expected = format!("{}\n", serde_json::to_string_pretty(&body).expect("json"));

        for kind in [ResourceKind::Application, ResourceKind::Logs, ResourceKind::Deployment] {
            let out = render_with(&client, Format::Json, &body.to_string(), kind, Verb::Get).await;
            assert_eq!(out, expected);
        }
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn json_flag_keeps_portal_key_order() {
        let client = client(FakeTransport::new());
        let body = r#"{"reference":"TSI01","applicationName":"nginx","_links":{}}"#;
        let out = render_with(&client, Format::Json, body, ResourceKind::Deployment, Verb::Get).await;
        assert_eq!(
            out,
            "{\n  \"reference\": \"TSI01\",\n  \"applicationName\": \"nginx\",\n  \"_links\": {}\n}\n"
        );
    }

    #[tokio::test]
    async fn yaml_sorts_keys() {
        let client = client(FakeTransport::new());
        let body = r#"{"version":"stable","name":"nginx"}"#;
        let out = render_with(&client, Format::Table, body, ResourceKind::Application, Verb::Get).await;
        assert_eq!(out, "name: nginx\nversion: stable\n\n");
    }

    #[tokio::test]
    async fn non_get_verbs_render_yaml_even_with_envelope() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": { "applicationResourceList": [{ "name": "nginx", "version": "1.0" }] } });

        for verb in [Verb::Create, Verb::Delete, Verb::Stop] {
            let out = render_with(&client, Format::Table, &body.to_string(), ResourceKind::Application, verb).await;
            assert!(out.starts_with("_embedded:"));
            assert!(!out.contains("VERSION"));
        }
    }

    #[tokio::test]
    async fn non_get_on_deployments_skips_status_lookups() {
        let client = client(FakeTransport::new());
        let record = json!({ "reference": "TSI01", "applicationName": "nginx", "_links": { "status": { "href": STATUS_URL } } });
        render_with(&client, Format::Table, &deployment_listing(&record), ResourceKind::Deployment, Verb::Delete).await;
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn single_object_falls_back_to_yaml() {
        let client = client(FakeTransport::new());
        let body = json!({ "name": "nginx", "version": "stable" }).to_string();
        let out = render_with(&client, Format::Table, &body, ResourceKind::Application, Verb::Get).await;
        assert_eq!(out, "name: nginx\nversion: stable\n\n");
    }

    #[tokio::test]
    async fn yaml_is_block_style() {
        let client = client(FakeTransport::new());
        let body = json!({ "fields": [{ "key": "a", "value": "b" }], "name": "p" }).to_string();
        let out = render_with(&client, Format::Table, &body, ResourceKind::Logs, Verb::Get).await;
        assert!(out.contains("fields:\n"));
        assert!(out.contains("- key: a\n"));
        assert!(out.contains("value: b\n"));
        assert!(!out.contains('{'));
        assert!(!out.contains('['));
    }

    #[tokio::test]
    async fn application_table() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": { "applicationResourceList": [
            { "name": "nginx", "version": "1.0" },
            { "name": "generic-server-instance", "version": "0.3" },
        ] } })
        .to_string();

        let out = render_with(&client, Format::Table, &body, ResourceKind::Application, Verb::Get).await;
        let width = "generic-server-instance".len() + 2;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{:<width$}{:<width$}", "NAME", "VERSION"));
        assert_eq!(lines[1], format!("{:<width$}{:<width$}", "nginx", "1.0"));
        assert_eq!(lines[2], format!("{:<width$}{:<width$}", "generic-server-instance", "0.3"));
    }

    #[tokio::test]
    async fn deployment_table_with_status_lookup() {
        let client = client(FakeTransport::new().with_response(STATUS_URL, 200, r#"{"status":"RUNNING"}"#));
        let record = json!({
            "reference": "TSI01",
            "applicationName": "nginx",
            "_links": { "status": { "href": STATUS_URL } },
        });

        let out = render_with(&client, Format::Table, &deployment_listing(&record), ResourceKind::Deployment, Verb::Get).await;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("REFERENCE"));
        assert!(lines[0].contains("APP NAME"));
        let cells: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(cells, ["TSI01", "nginx", "RUNNING"]);

        let sent = client.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, STATUS_URL);
    }

    #[tokio::test]
    async fn missing_started_time_renders_empty_cell() {
        let client = client(FakeTransport::new().with_response(STATUS_URL, 200, r#"{"status":"RUNNING"}"#));
        let record = json!({ "reference": "TSI01", "applicationName": "nginx", "_links": { "status": { "href": STATUS_URL } } });

        let out = render_with(&client, Format::Table, &deployment_listing(&record), ResourceKind::Deployment, Verb::Get).await;
        let width = "REFERENCE".len() + 2;
        let row = out.lines().nth(1).expect("row");
        assert_eq!(
            row,
            format!("{:<width$}{:<width$}{:<width$}{:<width$}", "TSI01", "nginx", "", "RUNNING")
        );
    }

    #[tokio::test]
    async fn zero_started_time_is_local_epoch() {
        let client = client(FakeTransport::new().with_response(STATUS_URL, 200, r#"{"status":"RUNNING"}"#));
        let record = json!({
            "reference": "TSI01",
            "applicationName": "nginx",
            "startedTime": 0,
            "_links": { "status": { "href": STATUS_URL } },
        });

        let out = render_with(&client, Format::Table, &deployment_listing(&record), ResourceKind::Deployment, Verb::Get).await;
        let epoch = Local
            .timestamp_opt(0, 0)
            .single()
            .expect("epoch")
            .format("%H:%M %d-%m-%Y")
            .to_string();
        assert!(out.contains(&epoch));
    }

    #[tokio::test]
    async fn failed_status_lookup_is_isolated_per_row() {
        let ok_url = "https://portal.test/deployment/TSI02/status";
        let client = client(
            FakeTransport::new()
                .with_failure(STATUS_URL, "connection reset")
                .with_response(ok_url, 200, r#"{"status":"DESTROYED"}"#),
        );
        let body = json!({ "_embedded": { "deploymentResourceList": [
            { "reference": "TSI01", "applicationName": "nginx", "_links": { "status": { "href": STATUS_URL } } },
            { "reference": "TSI02", "applicationName": "nginx", "_links": { "status": { "href": ok_url } } },
        ] } })
        .to_string();

        let out = render_with(&client, Format::Table, &body, ResourceKind::Deployment, Verb::Get).await;
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].contains(STATUS_ERROR));
        assert!(lines[2].contains("DESTROYED"));
    }

    #[tokio::test]
    async fn status_without_field_or_link_is_error_cell() {
        let client = client(FakeTransport::new().with_response(STATUS_URL, 200, r#"{"state":"?"}"#));
        let body = json!({ "_embedded": { "deploymentResourceList": [
            { "reference": "TSI01", "applicationName": "a", "_links": { "status": { "href": STATUS_URL } } },
            { "reference": "TSI02", "applicationName": "b" },
        ] } })
        .to_string();

        let out = render_with(&client, Format::Table, &body, ResourceKind::Deployment, Verb::Get).await;
        assert_eq!(out.matches(STATUS_ERROR).count(), 2);
    }

    #[tokio::test]
    async fn configuration_listing() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": { "configurationResourceList": [{
            "name": "small-os",
            "cloudProviderParametersName": "os-creds",
            "sshKey": "ssh-rsa AAAA",
            "deploymentParametersName": "small",
        }] } })
        .to_string();

        let out = render_with(&client, Format::Table, &body, ResourceKind::Configuration, Verb::Get).await;
        assert_eq!(
            out,
            "- small-os:\n    Cloud provider parameters: os-creds\n    SSH Public Key: ssh-rsa AAAA\n    Parameters: small\n"
        );
    }

    #[tokio::test]
    async fn credential_listing() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": { "cloudProviderParametersResourceList": [{
            "name": "os-creds",
            "cloudProvider": "OSTACK",
            "fields": [
                { "key": "OS_USERNAME", "value": "alice" },
                { "key": "OS_TENANT_NAME", "value": "tsi" },
            ],
        }] } })
        .to_string();

        let out = render_with(&client, Format::Table, &body, ResourceKind::Credential, Verb::Get).await;
        assert_eq!(
            out,
            "- os-creds:\n    Provider: OSTACK\n    Parameters: \n    * OS_USERNAME: alice\n    * OS_TENANT_NAME: tsi\n"
        );
    }

    #[tokio::test]
    async fn parameter_listing() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": { "configurationDeploymentParametersResourceList": [{
            "name": "small",
            "fields": [{ "key": "flavor", "value": "s1.small" }, { "key": "count", "value": 2 }],
        }] } })
        .to_string();

        let out = render_with(&client, Format::Table, &body, ResourceKind::Parameter, Verb::Get).await;
        assert_eq!(
            out,
            "- small:\n    Parameters: \n    * flavor: s1.small\n    * count: 2\n"
        );
    }

    #[tokio::test]
    async fn envelope_without_collection_renders_header_only() {
        let client = client(FakeTransport::new());
        let body = json!({ "_embedded": {} }).to_string();
        let out = render_with(&client, Format::Table, &body, ResourceKind::Application, Verb::Get).await;
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("NAME"));
    }

    #[test]
    fn deployment_record_tolerates_missing_fields() {
        let record: DeploymentRecord =
            serde_json::from_value(json!({ "reference": "TSI01" })).expect("decode");
        assert_eq!(record.reference, "TSI01");
        assert_eq!(record.application_name, "");
        assert_eq!(record.started_time, None);
        assert_eq!(record.status_href(), None);
    }

    #[test]
    fn deployment_record_reads_status_link() {
        let record: DeploymentRecord = serde_json::from_value(json!({
            "reference": "TSI01",
            "applicationName": null,
            "_links": { "self": { "href": "x" }, "status": { "href": STATUS_URL } },
        }))
        .expect("decode");
        assert_eq!(record.application_name, "");
        assert_eq!(record.status_href(), Some(STATUS_URL));
    }

    #[test]
    fn started_time_accepts_float_millis() {
        let record: DeploymentRecord =
            serde_json::from_value(json!({ "startedTime": 1_500_000_000_000.0 })).expect("decode");
        assert_eq!(record.started_time, Some(1_500_000_000_000));
    }

    #[test]
    fn non_string_scalars_decode_as_json_text() {
        let app: ApplicationRecord =
            serde_json::from_value(json!({ "name": "nginx", "version": 2 })).expect("decode");
        assert_eq!(app.version, "2");
        let field: Field =
            serde_json::from_value(json!({ "key": "debug", "value": false })).expect("decode");
        assert_eq!(field.value, "false");
    }

    #[test]
    fn sorted_keys_orders_nested_objects() {
        let value: Value = serde_json::from_str(r#"{"b":{"z":1,"a":2},"a":[{"y":0,"x":0}]}"#).expect("json");
        assert_eq!(
            sorted_keys(&value).to_string(),
            r#"{"a":[{"x":0,"y":0}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn square_table_uses_global_width() {
        let rows = vec![
            vec!["a".to_string(), "bb".to_string()],
            vec!["cccc".to_string(), "d".to_string()],
        ];
        let mut buf = Vec::new();
        write_square_table(&mut buf, &rows).expect("write");
        let out = String::from_utf8(buf).expect("utf8");
        assert_eq!(out, "a     bb    \ncccc  d     \n");
    }

    #[test]
    fn scalar_text_forms() {
        assert_eq!(scalar_text(&json!("x")), "x");
        assert_eq!(scalar_text(&json!(3)), "3");
        assert_eq!(scalar_text(&json!(true)), "true");
        assert_eq!(scalar_text(&Value::Null), "");
    }
}
