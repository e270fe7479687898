//! `GattClient` (spec §4.7, C7): the same public surface as
//! [`crate::HttpClient`], implemented on top of [`GattSession`] and
//! BLE instance-ID discovery instead of HAP-over-HTTP.

use std::collections::HashMap;

use hap_core::{Accessory, AccessoryDatabase, Aid, CharacteristicChange, Error, HapEvent, HapFormat, PairingIdentity, Result};
use hap_gatt::{decode_characteristic_signature, discover_accessory, GattSession};
use hap_pairing::{
    build_add_pairing_request, build_list_pairings_request, build_remove_pairing_request, parse_list_pairings_response,
    parse_pairing_ack, PairResume, PairSetup, PairVerify, PairingEntry, ResumeOutcome, ResumeSession, SessionKeys,
};
use hap_registry::{GattOpcode, GattParamTag};
use hap_transport::{GattCharacteristic, GattPeripheral, GattService};

use crate::ids::{CharacteristicId, CharacteristicReadResult, CharacteristicWrite, GetCharacteristicsOptions, SetCharacteristicResult};
use crate::pin;

/// HAP's well-known per-characteristic JSON status codes (spec §4.7),
/// reused here for the GATT facade's `207`-shaped per-id results.
const STATUS_SUCCESS: i32 = 0;
const STATUS_RESOURCE_DOES_NOT_EXIST: i32 = -70409;

/// Reserved HAP-BLE UUID for the per-service instance-ID characteristic
/// (spec §4.6). Duplicated from `hap-gatt`'s discovery module, which
/// keeps it private to its own traversal.
const SERVICE_INSTANCE_ID_UUID: &str = "E604E95D-A759-4817-87D3-AA005083A0D1";

type CharOf<P> = <<P as GattPeripheral>::Service as GattService>::Characteristic;

struct PairingHandles<P: GattPeripheral> {
    pair_setup: (u16, CharOf<P>),
    pair_verify: (u16, CharOf<P>),
    pairing_pairings: (u16, CharOf<P>),
}

enum PairingCharacteristic {
    PairSetup,
    PairVerify,
    PairingPairings,
}

/// A HAP-over-GATT controller connection. Discovery runs once at
/// [`Self::connect`] time and its characteristic handles are cached for
/// every later `get`/`set`/`subscribe` call addressed by instance ID.
pub struct GattClient<P: GattPeripheral> {
    session: GattSession<P>,
    identity: Option<PairingIdentity>,
    resume: Option<ResumeSession>,
    accessory: Option<Accessory>,
    characteristics: HashMap<u16, (CharOf<P>, HapFormat)>,
    pairing: Option<PairingHandles<P>>,
    identify_iid: Option<u16>,
}

impl<P: GattPeripheral> GattClient<P> {
    /// Connects to `peripheral` and discovers its services and
    /// characteristics, caching handles for both the Pairing service and
    /// every ordinary value characteristic (spec §4.6).
    pub async fn connect(peripheral: P) -> Result<Self> {
        let mut session = GattSession::new(peripheral);
        let (characteristics, pairing, identify_iid) = Self::discover_handles(&mut session).await?;
        Ok(Self {
            session,
            identity: None,
            resume: None,
            accessory: None,
            characteristics,
            pairing: Some(pairing),
            identify_iid,
        })
    }

    pub fn with_identity(mut self, identity: PairingIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn identity(&self) -> Option<&PairingIdentity> {
        self.identity.as_ref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.session.is_encrypted()
    }

    #[allow(clippy::type_complexity)]
    async fn discover_handles(
        session: &mut GattSession<P>,
    ) -> Result<(HashMap<u16, (CharOf<P>, HapFormat)>, PairingHandles<P>, Option<u16>)> {
        let mut characteristics = HashMap::new();
        let mut pairing = None;
        let mut identify_iid = None;

        let services = session.peripheral_mut().services().await?;
        for mut service in services {
            let service_uuid = service.uuid().to_string();
            let gatt_characteristics = service.characteristics().await?;

            if hap_registry::services::name_from_uuid(&service_uuid) == Some("Pairing") {
                pairing = Some(Self::index_pairing_handles(gatt_characteristics).await?);
                continue;
            }

            for mut characteristic in gatt_characteristics {
                let char_uuid = characteristic.uuid().to_string();
                if hap_registry::uuids_equal(&char_uuid, SERVICE_INSTANCE_ID_UUID) {
                    continue;
                }
                if hap_registry::services::name_from_uuid(&char_uuid) == Some("ServiceSignature") {
                    continue;
                }

                let iid = read_instance_id(&mut characteristic).await?;
                if hap_registry::characteristics::name_from_uuid(&char_uuid) == Some("Identify") {
                    identify_iid = Some(iid);
                }
                let body = session.perform_request(&mut characteristic, GattOpcode::SignatureRead, iid, None).await?;
                let signature = decode_characteristic_signature(&body)?;
                let format = signature.format.unwrap_or(HapFormat::Data);
                characteristics.insert(iid, (characteristic, format));
            }
        }

        let pairing = pairing.ok_or_else(|| Error::protocol("accessory exposes no Pairing service"))?;
        Ok((characteristics, pairing, identify_iid))
    }

    async fn index_pairing_handles(characteristics: Vec<CharOf<P>>) -> Result<PairingHandles<P>> {
        let mut pair_setup = None;
        let mut pair_verify = None;
        let mut pairing_pairings = None;

        for mut characteristic in characteristics {
            let char_uuid = characteristic.uuid().to_string();
            let iid = read_instance_id(&mut characteristic).await?;
            match hap_registry::characteristics::name_from_uuid(&char_uuid) {
                Some("PairSetup") => pair_setup = Some((iid, characteristic)),
                Some("PairVerify") => pair_verify = Some((iid, characteristic)),
                Some("PairingPairings") => pairing_pairings = Some((iid, characteristic)),
                _ => {}
            }
        }

        Ok(PairingHandles {
            pair_setup: pair_setup.ok_or_else(|| Error::protocol("Pairing service has no PairSetup characteristic"))?,
            pair_verify: pair_verify.ok_or_else(|| Error::protocol("Pairing service has no PairVerify characteristic"))?,
            pairing_pairings: pairing_pairings
                .ok_or_else(|| Error::protocol("Pairing service has no PairingPairings characteristic"))?,
        })
    }

    /// Writes `body` to the named Pairing-service characteristic and
    /// reads back its response, wrapping/unwrapping the HAP-Param-Value
    /// TLV envelope every GATT characteristic I/O uses (spec §4.6).
    async fn exchange_pairing(&mut self, which: PairingCharacteristic, body: &[u8]) -> Result<Vec<u8>> {
        let pairing = self.pairing.as_mut().ok_or_else(|| Error::protocol("accessory exposes no Pairing service"))?;
        let (iid, characteristic) = match which {
            PairingCharacteristic::PairSetup => &mut pairing.pair_setup,
            PairingCharacteristic::PairVerify => &mut pairing.pair_verify,
            PairingCharacteristic::PairingPairings => &mut pairing.pairing_pairings,
        };

        let request_body = wrap_value_tlv(body);
        let response = self.session.perform_request(characteristic, GattOpcode::Write, *iid, Some(&request_body)).await?;
        unwrap_value_tlv(&response)
    }

    /// Writes `true` to the accessory-information `Identify`
    /// characteristic (BLE's unpaired-identify equivalent of
    /// [`crate::HttpClient::identify`]'s `POST /identify`). No session
    /// keys are required — this write is valid before `pair_verify`.
    pub async fn identify(&mut self) -> Result<()> {
        let iid = self.identify_iid.ok_or_else(|| Error::protocol("accessory exposes no Identify characteristic"))?;
        let (characteristic, _) = self
            .characteristics
            .get_mut(&iid)
            .ok_or_else(|| Error::protocol("Identify characteristic handle missing"))?;
        let body = wrap_value_tlv(&hap_registry::value_to_buffer(&hap_core::HapValue::Bool(true), HapFormat::Bool)?);
        self.session.perform_request(characteristic, GattOpcode::Write, iid, Some(&body)).await?;
        Ok(())
    }

    /// Runs Pair-Setup M1..M6 over the `PairSetup` characteristic.
    pub async fn pair_setup(&mut self, pin: &str) -> Result<PairingIdentity> {
        pin::validate(pin)?;

        let mut setup = PairSetup::new();
        let m2 = self.exchange_pairing(PairingCharacteristic::PairSetup, &setup.build_m1()).await?;
        let (salt, server_public) = setup.parse_m2(&m2)?;

        let m4 = self.exchange_pairing(PairingCharacteristic::PairSetup, &setup.build_m3(pin, &salt, &server_public)?).await?;
        setup.parse_m4(&m4)?;

        let m6 = self.exchange_pairing(PairingCharacteristic::PairSetup, &setup.build_m5()?).await?;
        let identity = setup.parse_m6(&m6)?;

        self.identity = Some(identity.clone());
        Ok(identity)
    }

    /// Runs Pair-Verify over the `PairVerify` characteristic, preferring
    /// Pair-Resume when a prior session was cached (same fallback
    /// strategy as [`crate::HttpClient::pair_verify`]).
    pub async fn pair_verify(&mut self) -> Result<()> {
        let identity = self.identity.clone().ok_or(Error::NotPaired)?;

        let session_keys = match self.resume.clone() {
            Some(cached) => {
                let resumer = PairResume::new(cached)?;
                let response = self.exchange_pairing(PairingCharacteristic::PairVerify, &resumer.build_m1()?).await?;
                match resumer.parse_m2(&response)? {
                    ResumeOutcome::Resumed(keys) => keys,
                    ResumeOutcome::Declined => self.full_pair_verify(&identity).await?,
                }
            }
            None => self.full_pair_verify(&identity).await?,
        };

        self.resume = Some(session_keys.resume.clone());
        self.session
            .set_session_keys(session_keys.controller_to_accessory, session_keys.accessory_to_controller);
        Ok(())
    }

    async fn full_pair_verify(&mut self, identity: &PairingIdentity) -> Result<SessionKeys> {
        let mut verify = PairVerify::new(identity);
        let m2 = self.exchange_pairing(PairingCharacteristic::PairVerify, &verify.build_m1()).await?;
        verify.parse_m2(&m2)?;

        let m4 = self.exchange_pairing(PairingCharacteristic::PairVerify, &verify.build_m3()?).await?;
        verify.parse_m4(&m4)?;
        verify.finish()
    }

    /// Reconstructs the attribute-database JSON tree from GATT
    /// discovery (spec §4.6). BLE accessories expose exactly one
    /// logical accessory, addressed as `Aid(1)`.
    pub async fn get_accessories(&mut self) -> Result<AccessoryDatabase> {
        let accessory = discover_accessory(&mut self.session, Aid(1)).await?;
        self.accessory = Some(accessory.clone());
        Ok(AccessoryDatabase { accessories: vec![accessory] })
    }

    /// Reads each requested `aid.iid` by instance ID. An id with no
    /// cached characteristic handle comes back with
    /// `status: -70409` (resource does not exist) instead of failing
    /// the whole call, mirroring HTTP's `207` semantics.
    pub async fn get_characteristics(
        &mut self,
        ids: &[CharacteristicId],
        options: GetCharacteristicsOptions,
    ) -> Result<Vec<CharacteristicReadResult>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let iid = id.iid.0 as u16;
            let Some((characteristic, format)) = self.characteristics.get_mut(&iid) else {
                results.push(not_found_result(*id));
                continue;
            };
            let format = *format;

            let body = self.session.perform_request(characteristic, GattOpcode::Read, iid, None).await?;
            let tlv = hap_tlv::Tlv::decode(&body);
            let value_bytes = tlv.get_required(GattParamTag::HapParamValue as u8)?;
            let value = hap_registry::buffer_to_value(value_bytes, format)?;

            let cached = self.cached_characteristic(id.aid.0, id.iid.0);
            results.push(CharacteristicReadResult {
                aid: id.aid.0,
                iid: id.iid.0,
                value: Some(value),
                status: Some(STATUS_SUCCESS),
                type_: options.type_.then(|| cached.map(|c| c.type_.clone())).flatten(),
                perms: options
                    .perms
                    .then(|| cached.map(|c| c.perms.as_strings().into_iter().map(String::from).collect()))
                    .flatten(),
                format: options.meta.then(|| format.wire_name().to_string()),
                unit: options.meta.then(|| cached.and_then(|c| c.unit.clone())).flatten(),
                description: options.meta.then(|| cached.and_then(|c| c.description.clone())).flatten(),
                min_value: options.meta.then(|| cached.and_then(|c| c.min_value.clone())).flatten(),
                max_value: options.meta.then(|| cached.and_then(|c| c.max_value.clone())).flatten(),
                min_step: options.meta.then(|| cached.and_then(|c| c.min_step.clone())).flatten(),
                ev: options.ev.then(|| cached.map(|c| c.ev)).flatten(),
            });
        }
        Ok(results)
    }

    fn cached_characteristic(&self, aid: u64, iid: u64) -> Option<&hap_core::Characteristic> {
        self.accessory
            .as_ref()
            .filter(|accessory| accessory.aid.0 == aid)
            .and_then(|accessory| accessory.services.iter().flat_map(|s| s.characteristics.iter()).find(|c| c.iid.0 == iid))
    }

    /// Writes each `aid.iid`/value pair by instance ID.
    pub async fn set_characteristics(&mut self, writes: &[CharacteristicWrite]) -> Result<Vec<SetCharacteristicResult>> {
        let mut results = Vec::with_capacity(writes.len());
        for write in writes {
            let iid = write.id.iid.0 as u16;
            let Some((characteristic, format)) = self.characteristics.get_mut(&iid) else {
                results.push(SetCharacteristicResult { id: write.id, status: STATUS_RESOURCE_DOES_NOT_EXIST });
                continue;
            };
            let bytes = hap_registry::value_to_buffer(&write.value, *format)?;
            let body = wrap_value_tlv(&bytes);
            self.session.perform_request(characteristic, GattOpcode::Write, iid, Some(&body)).await?;
            results.push(SetCharacteristicResult { id: write.id, status: STATUS_SUCCESS });
        }
        Ok(results)
    }

    pub async fn subscribe_characteristics(&mut self, ids: &[CharacteristicId]) -> Result<()> {
        self.set_subscription(ids, true).await
    }

    pub async fn unsubscribe_characteristics(&mut self, ids: &[CharacteristicId]) -> Result<()> {
        self.set_subscription(ids, false).await
    }

    async fn set_subscription(&mut self, ids: &[CharacteristicId], subscribe: bool) -> Result<()> {
        for id in ids {
            let iid = id.iid.0 as u16;
            let (characteristic, _) = self
                .characteristics
                .get_mut(&iid)
                .ok_or_else(|| Error::protocol(format!("no characteristic with iid {iid}")))?;
            if subscribe {
                self.session.subscribe(characteristic).await?;
            } else {
                self.session.unsubscribe(characteristic).await?;
            }
        }
        Ok(())
    }

    /// Waits for the next zero-byte indication on `id`, then performs
    /// the follow-up read the indication implies and decodes it (spec
    /// §4.6's subscription model).
    pub async fn await_indication(&mut self, id: CharacteristicId) -> Result<HapEvent> {
        let iid = id.iid.0 as u16;
        let (characteristic, format) = self
            .characteristics
            .get_mut(&iid)
            .ok_or_else(|| Error::protocol(format!("no characteristic with iid {iid}")))?;
        let format = *format;

        let value = self.session.await_indication(characteristic, iid, format).await?;
        Ok(HapEvent::CharacteristicsChanged { changes: vec![CharacteristicChange { aid: id.aid, iid: id.iid, value }] })
    }

    pub async fn add_pairing(&mut self, identifier: &str, ltpk: &[u8; 32], is_admin: bool) -> Result<()> {
        let request = build_add_pairing_request(identifier, ltpk, is_admin);
        let response = self.exchange_pairing(PairingCharacteristic::PairingPairings, &request).await?;
        parse_pairing_ack(&response)
    }

    pub async fn remove_pairing(&mut self, identifier: &str) -> Result<()> {
        let request = build_remove_pairing_request(identifier);
        let response = self.exchange_pairing(PairingCharacteristic::PairingPairings, &request).await?;
        parse_pairing_ack(&response)
    }

    pub async fn list_pairings(&mut self) -> Result<Vec<PairingEntry>> {
        let request = build_list_pairings_request();
        let response = self.exchange_pairing(PairingCharacteristic::PairingPairings, &request).await?;
        parse_list_pairings_response(&response)
    }

    pub async fn close(&mut self) -> Result<()> {
        self.session.peripheral_mut().disconnect().await?;
        Ok(())
    }
}

async fn read_instance_id<C: GattCharacteristic>(characteristic: &mut C) -> Result<u16> {
    let bytes = characteristic.read_instance_id().await?;
    Ok(u16::from_le_bytes(bytes))
}

fn wrap_value_tlv(bytes: &[u8]) -> Vec<u8> {
    hap_tlv::Tlv::builder().add(GattParamTag::HapParamValue as u8, bytes.to_vec()).encode()
}

fn unwrap_value_tlv(bytes: &[u8]) -> Result<Vec<u8>> {
    let tlv = hap_tlv::Tlv::decode(bytes);
    Ok(tlv.get_required(GattParamTag::HapParamValue as u8)?.to_vec())
}

fn not_found_result(id: CharacteristicId) -> CharacteristicReadResult {
    CharacteristicReadResult {
        aid: id.aid.0,
        iid: id.iid.0,
        value: None,
        status: Some(STATUS_RESOURCE_DOES_NOT_EXIST),
        type_: None,
        perms: None,
        format: None,
        unit: None,
        description: None,
        min_value: None,
        max_value: None,
        min_step: None,
        ev: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hap_core::HapValue;
    use hap_transport::TransportError;
    use std::collections::VecDeque;
    use uuid::Uuid;

    struct StubCharacteristic {
        uuid: Uuid,
        instance_id: [u8; 2],
        reads: VecDeque<Vec<u8>>,
        writes: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl GattCharacteristic for StubCharacteristic {
        fn uuid(&self) -> Uuid {
            self.uuid
        }

        async fn write(&mut self, value: &[u8]) -> Result<(), TransportError> {
            self.writes.push(value.to_vec());
            Ok(())
        }

        async fn read(&mut self) -> Result<Vec<u8>, TransportError> {
            Ok(self.reads.pop_front().unwrap_or_default())
        }

        async fn read_instance_id(&mut self) -> Result<[u8; 2], TransportError> {
            Ok(self.instance_id)
        }

        async fn subscribe(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn unsubscribe(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn next_indication(&mut self) -> Result<Vec<u8>, TransportError> {
            Ok(Vec::new())
        }
    }

    struct StubService {
        uuid: Uuid,
        characteristics: Vec<StubCharacteristic>,
    }

    #[async_trait]
    impl GattService for StubService {
        type Characteristic = StubCharacteristic;

        fn uuid(&self) -> Uuid {
            self.uuid
        }

        async fn characteristics(&mut self) -> Result<Vec<Self::Characteristic>, TransportError> {
            Ok(std::mem::take(&mut self.characteristics))
        }
    }

    struct StubPeripheral {
        services: Vec<StubService>,
    }

    #[async_trait]
    impl GattPeripheral for StubPeripheral {
        type Service = StubService;

        async fn services(&mut self) -> Result<Vec<Self::Service>, TransportError> {
            Ok(std::mem::take(&mut self.services))
        }

        fn mtu(&self) -> usize {
            104
        }

        async fn disconnect(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn lightbulb_on_off_service() -> StubService {
        // A single "On" (Bool) characteristic on a Lightbulb service,
        // plus its instance-id and signature-read plumbing.
        let on_characteristic = StubCharacteristic {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("25").unwrap()).unwrap(),
            instance_id: [10, 0],
            // SignatureRead response: Status=0, no format tag present (defaults to Data)
            // is acceptable for this smoke test; we only assert discovery succeeds.
            reads: VecDeque::from([vec![0x00, 0, 0x00, 0, 0], Vec::new()]),
            writes: Vec::new(),
        };

        StubService {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("43").unwrap()).unwrap(),
            characteristics: vec![on_characteristic],
        }
    }

    fn pairing_service() -> StubService {
        let pair_setup = StubCharacteristic {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("4C").unwrap()).unwrap(),
            instance_id: [20, 0],
            reads: VecDeque::new(),
            writes: Vec::new(),
        };
        let pair_verify = StubCharacteristic {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("4E").unwrap()).unwrap(),
            instance_id: [21, 0],
            reads: VecDeque::new(),
            writes: Vec::new(),
        };
        let pairing_pairings = StubCharacteristic {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("50").unwrap()).unwrap(),
            instance_id: [22, 0],
            reads: VecDeque::new(),
            writes: Vec::new(),
        };

        StubService {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("55").unwrap()).unwrap(),
            characteristics: vec![pair_setup, pair_verify, pairing_pairings],
        }
    }

    #[tokio::test]
    async fn connect_discovers_pairing_and_value_characteristics() {
        let peripheral = StubPeripheral { services: vec![pairing_service(), lightbulb_on_off_service()] };
        let client = GattClient::connect(peripheral).await.unwrap();
        assert!(client.pairing.is_some());
        assert_eq!(client.characteristics.len(), 1);
        assert!(client.characteristics.contains_key(&10));
    }

    #[tokio::test]
    async fn get_characteristics_reports_missing_iid() {
        let peripheral = StubPeripheral { services: vec![pairing_service(), lightbulb_on_off_service()] };
        let mut client = GattClient::connect(peripheral).await.unwrap();

        let results = client
            .get_characteristics(&[CharacteristicId::new(1, 999)], GetCharacteristicsOptions::default())
            .await
            .unwrap();
        assert_eq!(results[0].status, Some(STATUS_RESOURCE_DOES_NOT_EXIST));
        assert!(results[0].value.is_none());
    }

    fn accessory_information_service() -> StubService {
        let identify = StubCharacteristic {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("14").unwrap()).unwrap(),
            instance_id: [30, 0],
            // SignatureRead response, then the empty read terminating the identify Write's response loop.
            reads: VecDeque::from([vec![0x00, 0, 0x00, 0, 0], Vec::new()]),
            writes: Vec::new(),
        };

        StubService {
            uuid: Uuid::parse_str(&hap_registry::canonicalize_uuid("3E").unwrap()).unwrap(),
            characteristics: vec![identify],
        }
    }

    #[tokio::test]
    async fn identify_writes_true_to_the_identify_characteristic_without_pairing() {
        let peripheral =
            StubPeripheral { services: vec![pairing_service(), accessory_information_service()] };
        let mut client = GattClient::connect(peripheral).await.unwrap();
        assert!(client.identity.is_none());

        if let Some((characteristic, _)) = client.characteristics.get_mut(&30) {
            characteristic.reads.push_back(vec![0x00, 2, 0x00, 0, 0]);
            characteristic.reads.push_back(Vec::new());
        }

        client.identify().await.unwrap();

        let (characteristic, _) = client.characteristics.get(&30).unwrap();
        assert_eq!(characteristic.writes.len(), 1);
    }

    #[tokio::test]
    async fn set_characteristics_writes_through_cached_handle() {
        let peripheral = StubPeripheral { services: vec![pairing_service(), lightbulb_on_off_service()] };
        let mut client = GattClient::connect(peripheral).await.unwrap();

        // Queue a Success status response for the upcoming Write PDU.
        if let Some((characteristic, _)) = client.characteristics.get_mut(&10) {
            characteristic.reads.push_back(vec![0x00, 1, 0x00, 0, 0]);
            characteristic.reads.push_back(Vec::new());
        }

        let writes = vec![CharacteristicWrite { id: CharacteristicId::new(1, 10), value: HapValue::Bool(true) }];
        let results = client.set_characteristics(&writes).await.unwrap();
        assert_eq!(results[0].status, STATUS_SUCCESS);
    }
}
