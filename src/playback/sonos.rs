//! Sonos speaker control over UPnP AVTransport
//!
//! Sonos exposes a SOAP control endpoint on port 1400. Play-by-URL is
//! `SetAVTransportURI` followed by `Play`; the monitor polls
//! `GetTransportInfo`.

use async_trait::async_trait;

use crate::{Error, Result};

use super::{Speaker, TransportState};

const AVTRANSPORT_SERVICE: &str = "urn:schemas-upnp-org:service:AVTransport:1";
const CONTROL_PORT: u16 = 1400;

/// A Sonos zone player addressed by IP
pub struct SonosSpeaker {
    client: reqwest::Client,
    control_url: String,
}

impl SonosSpeaker {
    /// Connect to a speaker at `addr` (IP or hostname)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(addr: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            control_url: format!("http://{addr}:{CONTROL_PORT}/MediaRenderer/AVTransport/Control"),
        })
    }

    /// Send one SOAP action to the AVTransport service and return the body
    async fn soap_request(&self, action: &str, arguments: &str) -> Result<String> {
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:{action} xmlns:u="{AVTRANSPORT_SERVICE}">
      <InstanceID>0</InstanceID>
      {arguments}
    </u:{action}>
  </s:Body>
</s:Envelope>"#
        );

        let response = self
            .client
            .post(&self.control_url)
            .header("Content-Type", "text/xml; charset=\"utf-8\"")
            .header("SOAPACTION", format!("\"{AVTRANSPORT_SERVICE}#{action}\""))
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Playback(format!("{action} request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Playback(format!("{action} error {status}: {text}")));
        }

        Ok(text)
    }
}

#[async_trait]
impl Speaker for SonosSpeaker {
    async fn play(&self, url: &str) -> Result<()> {
        tracing::info!(%url, "dispatching playback to speaker");

        let set_uri_args = format!(
            "<CurrentURI>{}</CurrentURI><CurrentURIMetaData></CurrentURIMetaData>",
            escape_xml(url)
        );
        self.soap_request("SetAVTransportURI", &set_uri_args).await?;
        self.soap_request("Play", "<Speed>1</Speed>").await?;

        Ok(())
    }

    async fn transport_state(&self) -> Result<TransportState> {
        let body = self.soap_request("GetTransportInfo", "").await?;

        let state = extract_tag(&body, "CurrentTransportState").ok_or_else(|| {
            Error::Playback("GetTransportInfo response missing transport state".to_string())
        })?;

        Ok(TransportState::from_wire(state))
    }
}

/// Extract the text content of the first `<tag>...</tag>` pair
fn extract_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

/// Minimal XML escaping for URI values embedded in SOAP bodies
fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_transport_state_from_soap_body() {
        let body = r"<s:Envelope><s:Body><u:GetTransportInfoResponse>
            <CurrentTransportState>PLAYING</CurrentTransportState>
            <CurrentTransportStatus>OK</CurrentTransportStatus>
        </u:GetTransportInfoResponse></s:Body></s:Envelope>";

        assert_eq!(extract_tag(body, "CurrentTransportState"), Some("PLAYING"));
        assert_eq!(extract_tag(body, "Missing"), None);
    }

    #[test]
    fn escapes_uri_metadata() {
        assert_eq!(
            escape_xml("http://h/a.mp3?x=1&y=<2>"),
            "http://h/a.mp3?x=1&amp;y=&lt;2&gt;"
        );
    }
}
