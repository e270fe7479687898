//! `HttpClient` (spec §4.7, C7): ties the pairing engine (`hap-pairing`),
//! secure framing (`hap-framing`, via `hap-http`'s `HttpConnection`) and
//! the HAP-over-HTTP transport together into the caller-facing API —
//! identify, pair, verify, and read/write/subscribe characteristics.

use hap_core::{AccessoryDatabase, Error, HapEvent, PairingIdentity, Result};
use hap_http::{ContentType, HttpConnection, HttpResponse};
use hap_pairing::{
    build_add_pairing_request, build_list_pairings_request, build_remove_pairing_request, parse_list_pairings_response,
    parse_pairing_ack, PairResume, PairSetup, PairVerify, PairingEntry, ResumeOutcome, ResumeSession, SessionKeys,
};
use hap_transport::ByteTransport;

use crate::error::ClientError;
use crate::ids::{
    build_query, CharacteristicId, CharacteristicReadResult, CharacteristicWrite, CharacteristicsGetBody, GetCharacteristicsOptions,
    SetCharacteristicEntry, SetCharacteristicResult, SetCharacteristicsBody, SetCharacteristicsResponseBody,
};
use crate::pin;

/// A HAP-over-HTTP controller connection. Plaintext until [`Self::pair_verify`]
/// (or a successful resume) installs session keys on the underlying
/// [`HttpConnection`]; every operation after that point is encrypted.
pub struct HttpClient<T: ByteTransport> {
    connection: HttpConnection<T>,
    identity: Option<PairingIdentity>,
    resume: Option<ResumeSession>,
}

impl<T: ByteTransport> HttpClient<T> {
    /// Opens the connection over `transport`. Pairs with no identity yet —
    /// call [`Self::pair_setup`] or attach one with [`Self::with_identity`].
    pub async fn connect(transport: T) -> Result<Self> {
        let mut connection = HttpConnection::new(transport);
        connection.open()?;
        Ok(Self { connection, identity: None, resume: None })
    }

    /// Attaches a previously persisted identity (the caller owns storage
    /// per spec §1's Non-goal), enabling [`Self::pair_verify`] without a
    /// fresh Pair-Setup.
    pub fn with_identity(mut self, identity: PairingIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn identity(&self) -> Option<&PairingIdentity> {
        self.identity.as_ref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.connection.is_encrypted()
    }

    /// `POST /identify`, expects `204`.
    pub async fn identify(&mut self) -> Result<()> {
        let response = self.connection.post("/identify", ContentType::HapJson, b"").await?;
        expect_status(&response, 204)
    }

    /// Runs Pair-Setup M1..M6 (spec §4.3) and stores the resulting
    /// identity for subsequent [`Self::pair_verify`] calls.
    pub async fn pair_setup(&mut self, pin: &str) -> Result<PairingIdentity> {
        pin::validate(pin)?;

        let mut setup = PairSetup::new();
        let m2 = self.exchange_pairing("/pair-setup", &setup.build_m1()).await?;
        let (salt, server_public) = setup.parse_m2(&m2)?;

        let m4 = self.exchange_pairing("/pair-setup", &setup.build_m3(pin, &salt, &server_public)?).await?;
        setup.parse_m4(&m4)?;

        let m6 = self.exchange_pairing("/pair-setup", &setup.build_m5()?).await?;
        let identity = setup.parse_m6(&m6)?;

        self.identity = Some(identity.clone());
        Ok(identity)
    }

    /// Runs Pair-Verify (spec §4.3), preferring Pair-Resume when a prior
    /// session was cached. A declined resume falls back to a fresh
    /// Pair-Verify ceremony with new ephemeral keys rather than replaying
    /// the declined bytes, since the cached resume state and a standard
    /// ceremony use independent ephemeral Curve25519 keypairs (see
    /// DESIGN.md's resolution of spec §9's resume ambiguity).
    pub async fn pair_verify(&mut self) -> Result<()> {
        let identity = self.identity.clone().ok_or(Error::NotPaired)?;

        let session_keys = match self.resume.clone() {
            Some(cached) => {
                let resumer = PairResume::new(cached)?;
                let response = self.exchange_pairing("/pair-verify", &resumer.build_m1()?).await?;
                match resumer.parse_m2(&response)? {
                    ResumeOutcome::Resumed(keys) => keys,
                    ResumeOutcome::Declined => self.full_pair_verify(&identity).await?,
                }
            }
            None => self.full_pair_verify(&identity).await?,
        };

        self.resume = Some(session_keys.resume.clone());
        self.connection
            .set_session_keys(session_keys.controller_to_accessory, session_keys.accessory_to_controller);
        Ok(())
    }

    async fn full_pair_verify(&mut self, identity: &PairingIdentity) -> Result<SessionKeys> {
        let mut verify = PairVerify::new(identity);
        let m2 = self.exchange_pairing("/pair-verify", &verify.build_m1()).await?;
        verify.parse_m2(&m2)?;

        let m4 = self.exchange_pairing("/pair-verify", &verify.build_m3()?).await?;
        verify.parse_m4(&m4)?;
        verify.finish()
    }

    /// `POST <path>` with a `application/pairing+tlv8` body, returning the
    /// raw response TLV bytes once the HTTP status itself looks healthy.
    async fn exchange_pairing(&mut self, path: &str, body: &[u8]) -> Result<Vec<u8>> {
        let response = self.connection.post(path, ContentType::PairingTlv8, body).await?;
        if !hap_registry::http::is_success(response.status_code) {
            return Err(ClientError::UnexpectedStatus(response.status_code).into());
        }
        Ok(response.body)
    }

    /// `GET /accessories`.
    pub async fn get_accessories(&mut self) -> Result<AccessoryDatabase> {
        let response = self.connection.get("/accessories", ContentType::HapJson).await?;
        expect_status(&response, 200)?;
        parse_json(&response.body)
    }

    /// `GET /characteristics?id=...&meta=1&perms=1&type=1&ev=1`.
    pub async fn get_characteristics(
        &mut self,
        ids: &[CharacteristicId],
        options: GetCharacteristicsOptions,
    ) -> Result<Vec<CharacteristicReadResult>> {
        let path = format!("/characteristics?{}", build_query(ids, options));
        let response = self.connection.get(&path, ContentType::HapJson).await?;
        if !hap_registry::http::has_parseable_body(response.status_code) {
            return Err(ClientError::UnexpectedStatus(response.status_code).into());
        }
        let body: CharacteristicsGetBody = parse_json(&response.body)?;
        Ok(body.characteristics)
    }

    /// `PUT /characteristics` carrying `value` for each write. A `204`
    /// means every write succeeded (echoed back as `status: 0`); a `207`
    /// carries the accessory's per-characteristic status codes.
    pub async fn set_characteristics(&mut self, writes: &[CharacteristicWrite]) -> Result<Vec<SetCharacteristicResult>> {
        let body = SetCharacteristicsBody {
            characteristics: writes
                .iter()
                .map(|w| SetCharacteristicEntry {
                    aid: w.id.aid.0,
                    iid: w.id.iid.0,
                    value: Some(w.value.clone()),
                    ev: None,
                })
                .collect(),
        };
        let response = self.connection.put("/characteristics", ContentType::HapJson, &to_json(&body)?).await?;

        match response.status_code {
            204 => Ok(writes.iter().map(|w| SetCharacteristicResult { id: w.id, status: 0 }).collect()),
            207 => {
                let parsed: SetCharacteristicsResponseBody = parse_json(&response.body)?;
                Ok(parsed
                    .characteristics
                    .into_iter()
                    .map(|e| SetCharacteristicResult { id: CharacteristicId::new(e.aid, e.iid), status: e.status })
                    .collect())
            }
            other => Err(ClientError::UnexpectedStatus(other).into()),
        }
    }

    /// `PUT /characteristics` with `ev:true` for each id.
    pub async fn subscribe_characteristics(&mut self, ids: &[CharacteristicId]) -> Result<()> {
        self.set_event_subscription(ids, true).await
    }

    /// `PUT /characteristics` with `ev:false` for each id.
    pub async fn unsubscribe_characteristics(&mut self, ids: &[CharacteristicId]) -> Result<()> {
        self.set_event_subscription(ids, false).await
    }

    async fn set_event_subscription(&mut self, ids: &[CharacteristicId], ev: bool) -> Result<()> {
        let body = SetCharacteristicsBody {
            characteristics: ids
                .iter()
                .map(|id| SetCharacteristicEntry { aid: id.aid.0, iid: id.iid.0, value: None, ev: Some(ev) })
                .collect(),
        };
        let response = self.connection.put("/characteristics", ContentType::HapJson, &to_json(&body)?).await?;
        expect_status(&response, 204)
    }

    /// Drives the `EVENT/1.0` parser for the next asynchronous push
    /// message. Call this in a loop after [`Self::subscribe_characteristics`]
    /// leaves the connection listening (spec §4.5).
    pub async fn next_event(&mut self) -> Result<HapEvent> {
        self.connection.next_event().await
    }

    /// `AddPairing` (spec §4.3's closing paragraph): runs inside the
    /// already-verified session established by [`Self::pair_verify`].
    pub async fn add_pairing(&mut self, identifier: &str, ltpk: &[u8; 32], is_admin: bool) -> Result<()> {
        let request = build_add_pairing_request(identifier, ltpk, is_admin);
        let response = self.exchange_pairing("/pairings", &request).await?;
        parse_pairing_ack(&response)
    }

    pub async fn remove_pairing(&mut self, identifier: &str) -> Result<()> {
        let request = build_remove_pairing_request(identifier);
        let response = self.exchange_pairing("/pairings", &request).await?;
        parse_pairing_ack(&response)
    }

    pub async fn list_pairings(&mut self) -> Result<Vec<PairingEntry>> {
        let request = build_list_pairings_request();
        let response = self.exchange_pairing("/pairings", &request).await?;
        parse_list_pairings_response(&response)
    }

    pub async fn close(&mut self) -> Result<()> {
        self.connection.close().await
    }
}

fn expect_status(response: &HttpResponse, expected: u16) -> Result<()> {
    if response.status_code == expected {
        Ok(())
    } else {
        Err(ClientError::UnexpectedStatus(response.status_code).into())
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::protocol(format!("malformed JSON body: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::protocol(format!("failed to serialize JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hap_core::HapValue;
    use hap_transport::TransportError;
    use std::collections::VecDeque;

    struct MockTransport {
        inbox: VecDeque<Vec<u8>>,
        sent: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl ByteTransport for MockTransport {
        async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }

        async fn recv(&mut self) -> Result<Vec<u8>, TransportError> {
            Ok(self.inbox.pop_front().unwrap_or_default())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn client_with_responses(responses: Vec<&str>) -> HttpClient<MockTransport> {
        let transport = MockTransport {
            inbox: responses.into_iter().map(|r| r.as_bytes().to_vec()).collect(),
            sent: Vec::new(),
        };
        let mut connection = HttpConnection::new(transport);
        connection.open().unwrap();
        HttpClient { connection, identity: None, resume: None }
    }

    #[tokio::test]
    async fn identify_accepts_204() {
        let mut client = client_with_responses(vec!["HTTP/1.1 204 No Content\r\n\r\n"]);
        client.identify().await.unwrap();
    }

    #[tokio::test]
    async fn identify_rejects_unexpected_status() {
        let mut client = client_with_responses(vec!["HTTP/1.1 500 Internal Server Error\r\n\r\n"]);
        assert!(client.identify().await.is_err());
    }

    #[tokio::test]
    async fn get_accessories_parses_body() {
        let json = br#"{"accessories":[{"aid":1,"services":[]}]}"#;
        let wire = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}", json.len(), std::str::from_utf8(json).unwrap());
        let mut client = client_with_responses(vec![&wire]);
        let db = client.get_accessories().await.unwrap();
        assert_eq!(db.accessories.len(), 1);
        assert_eq!(db.accessories[0].aid.0, 1);
    }

    #[tokio::test]
    async fn set_characteristics_204_echoes_success() {
        let mut client = client_with_responses(vec!["HTTP/1.1 204 No Content\r\n\r\n"]);
        let writes = vec![CharacteristicWrite { id: CharacteristicId::new(1, 10), value: HapValue::Bool(true) }];
        let results = client.set_characteristics(&writes).await.unwrap();
        assert_eq!(results[0].status, 0);
    }

    #[tokio::test]
    async fn set_characteristics_207_parses_per_id_status() {
        let json = br#"{"characteristics":[{"aid":1,"iid":10,"status":-70402}]}"#;
        let wire = format!("HTTP/1.1 207 Multi-Status\r\nContent-Length: {}\r\n\r\n{}", json.len(), std::str::from_utf8(json).unwrap());
        let mut client = client_with_responses(vec![&wire]);
        let writes = vec![CharacteristicWrite { id: CharacteristicId::new(1, 10), value: HapValue::Bool(true) }];
        let results = client.set_characteristics(&writes).await.unwrap();
        assert_eq!(results[0].status, -70402);
    }

    #[tokio::test]
    async fn pair_setup_rejects_malformed_pin() {
        let mut client = client_with_responses(vec![]);
        assert!(client.pair_setup("not-a-pin").await.is_err());
        // No bytes should have been sent before the PIN is even validated.
        assert!(!client.connection.is_encrypted());
    }
}
