//! Instance-ID discovery: walks a peripheral's services/characteristics
//! and reconstructs the attribute database `getAccessories()` returns
//! over HTTP for free (spec §4.6).

use hap_core::{Accessory, Aid, Characteristic, HapFormat, Iid, Service};
use hap_registry::GattOpcode;
use hap_transport::{GattCharacteristic, GattPeripheral, GattService};

use crate::error::GattTransportError;
use crate::session::GattSession;
use crate::signature::{decode_characteristic_signature, decode_service_signature};

/// Reserved HAP-BLE UUID for the per-service instance-ID characteristic
/// (spec §4.6: "services' iid lives in a special per-service
/// characteristic"). Not a named HAP service/characteristic, so it lives
/// here rather than in the registry's name tables.
const SERVICE_INSTANCE_ID_UUID: &str = "E604E95D-A759-4817-87D3-AA005083A0D1";

/// Walks every non-filtered service on `session`'s peripheral and returns
/// the fully populated accessory the BLE equivalent of `getAccessories()`
/// describes. BLE accessories expose exactly one logical accessory, so
/// `aid` is supplied by the caller (almost always `Aid(1)`).
pub async fn discover_accessory<P>(session: &mut GattSession<P>, aid: Aid) -> Result<Accessory, GattTransportError>
where
    P: GattPeripheral,
{
    let mut services_out = Vec::new();

    let gatt_services = session.peripheral_mut().services().await?;
    for mut gatt_service in gatt_services {
        let service_uuid = gatt_service.uuid().to_string();
        if is_filtered_service(&service_uuid) {
            continue;
        }

        let service = discover_service(session, &mut gatt_service, &service_uuid).await?;
        services_out.push(service);
    }

    Ok(Accessory { aid, services: services_out })
}

fn is_filtered_service(uuid: &str) -> bool {
    matches!(
        hap_registry::services::name_from_uuid(uuid),
        Some("Pairing") | Some("ProtocolInformation")
    )
}

async fn discover_service<P, S>(
    session: &mut GattSession<P>,
    gatt_service: &mut S,
    service_uuid: &str,
) -> Result<Service, GattTransportError>
where
    P: GattPeripheral,
    S: GattService,
{
    let mut gatt_characteristics = gatt_service.characteristics().await?;

    let mut service_instance_id_char = None;
    let mut service_signature_char = None;
    let mut value_characteristics = Vec::new();
    for (index, gatt_char) in gatt_characteristics.iter().enumerate() {
        let char_uuid = gatt_char.uuid().to_string();
        if hap_registry::uuids_equal(&char_uuid, SERVICE_INSTANCE_ID_UUID) {
            service_instance_id_char = Some(index);
        } else if hap_registry::services::name_from_uuid(&char_uuid) == Some("ServiceSignature") {
            service_signature_char = Some(index);
        } else {
            value_characteristics.push(index);
        }
    }

    let service_iid = match service_instance_id_char {
        Some(index) => read_instance_id(&mut gatt_characteristics[index]).await?,
        None => return Err(GattTransportError::InstanceIdNotFound(service_uuid.to_string())),
    };

    let (primary, hidden) = match service_signature_char {
        Some(index) => {
            let characteristic = &mut gatt_characteristics[index];
            let body = session
                .perform_request(characteristic, GattOpcode::ServiceSignatureRead, service_iid, None)
                .await?;
            let signature = decode_service_signature(&body);
            (Some(signature.primary), Some(signature.hidden))
        }
        None => (None, None),
    };

    let mut characteristics_out = Vec::with_capacity(value_characteristics.len());
    for index in value_characteristics {
        let characteristic = &mut gatt_characteristics[index];
        let char_uuid = characteristic.uuid().to_string();
        let iid = read_instance_id(characteristic).await?;

        let body = session
            .perform_request(characteristic, GattOpcode::SignatureRead, iid, None)
            .await?;
        let signature = decode_characteristic_signature(&body)?;
        let format = signature.format.unwrap_or(HapFormat::Data);

        characteristics_out.push(Characteristic {
            iid: Iid(iid as u64),
            type_: signature
                .type_uuid
                .unwrap_or_else(|| hap_registry::canonicalize_uuid(&char_uuid).unwrap_or(char_uuid)),
            format,
            perms: signature.perms,
            ev: signature.perms.events,
            value: None,
            min_value: signature.min_value,
            max_value: signature.max_value,
            min_step: signature.min_step,
            unit: signature.unit,
            description: signature.description,
            valid_values: None,
            valid_values_range: None,
        });
    }

    Ok(Service {
        iid: Iid(service_iid as u64),
        type_: hap_registry::canonicalize_uuid(service_uuid).unwrap_or_else(|_| service_uuid.to_string()),
        primary,
        hidden,
        characteristics: characteristics_out,
    })
}

async fn read_instance_id<C: GattCharacteristic>(characteristic: &mut C) -> Result<u16, GattTransportError> {
    let bytes = characteristic.read_instance_id().await?;
    Ok(u16::from_le_bytes(bytes))
}
