//! `buffer_to_value` / `value_to_buffer` (spec §4.2): little-endian byte
//! codec per [`HapFormat`], plus the BT-SIG presentation-format and unit
//! tables GATT characteristic signatures are decoded against.
//!
//! Spec §9 calls out that the source this was distilled from unpacks
//! `uint64`/`float` ranges with a 32-bit shift idiom that silently
//! overflows; every conversion here uses native 64-bit (or IEEE-754
//! `f64`-backed `f32`) arithmetic instead.

use crate::error::RegistryError;
use hap_core::{HapFormat, HapValue};

/// Decode `bytes` (little-endian) into a [`HapValue`] per `format`.
pub fn buffer_to_value(bytes: &[u8], format: HapFormat) -> Result<HapValue, RegistryError> {
    Ok(match format {
        HapFormat::Bool => HapValue::Bool(bytes.first().copied().unwrap_or(0) != 0),
        HapFormat::UInt8 => HapValue::UInt(*bytes.first().ok_or(err(format))? as u64),
        HapFormat::UInt16 => HapValue::UInt(read_uint(bytes, 2)? ),
        HapFormat::UInt32 => HapValue::UInt(read_uint(bytes, 4)?),
        HapFormat::UInt64 => HapValue::UInt(read_uint(bytes, 8)?),
        HapFormat::Int => HapValue::Int(read_uint(bytes, 4)? as i32 as i64),
        HapFormat::Float => {
            let raw = read_uint(bytes, 4)? as u32;
            HapValue::Float(f32::from_bits(raw) as f64)
        }
        HapFormat::String => HapValue::Str(
            std::str::from_utf8(bytes)
                .map_err(|_| err(format))?
                .to_string(),
        ),
        HapFormat::Data => HapValue::Data(bytes.to_vec()),
    })
}

/// Encode a [`HapValue`] to its little-endian wire representation for `format`.
pub fn value_to_buffer(value: &HapValue, format: HapFormat) -> Result<Vec<u8>, RegistryError> {
    Ok(match (value, format) {
        (HapValue::Bool(b), HapFormat::Bool) => vec![*b as u8],
        (HapValue::UInt(v), HapFormat::UInt8) => vec![*v as u8],
        (HapValue::UInt(v), HapFormat::UInt16) => (*v as u16).to_le_bytes().to_vec(),
        (HapValue::UInt(v), HapFormat::UInt32) => (*v as u32).to_le_bytes().to_vec(),
        (HapValue::UInt(v), HapFormat::UInt64) => v.to_le_bytes().to_vec(),
        (HapValue::Int(v), HapFormat::Int) => (*v as i32).to_le_bytes().to_vec(),
        (HapValue::Float(v), HapFormat::Float) => (*v as f32).to_le_bytes().to_vec(),
        (HapValue::Str(s), HapFormat::String) => s.as_bytes().to_vec(),
        (HapValue::Data(d), HapFormat::Data) => d.clone(),
        _ => return Err(RegistryError::ValueFormatMismatch(format)),
    })
}

fn read_uint(bytes: &[u8], width: usize) -> Result<u64, RegistryError> {
    if bytes.len() < width {
        return Err(RegistryError::UnsupportedFormat(format!(
            "expected {width} bytes, got {}",
            bytes.len()
        )));
    }
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(&bytes[..width]);
    Ok(u64::from_le_bytes(buf))
}

fn err(format: HapFormat) -> RegistryError {
    RegistryError::UnsupportedFormat(format.wire_name().to_string())
}

/// BT-SIG GATT "Characteristic Presentation Format" format byte (Bluetooth
/// SIG assigned numbers) mapped to the [`HapFormat`] it carries.
pub fn hap_format_from_bt_sig(format_byte: u8) -> Option<HapFormat> {
    Some(match format_byte {
        0x01 => HapFormat::Bool,
        0x04 => HapFormat::UInt8,
        0x06 => HapFormat::UInt16,
        0x08 => HapFormat::UInt32,
        0x0A => HapFormat::UInt64,
        0x10 => HapFormat::Int,
        0x14 => HapFormat::Float,
        0x19 => HapFormat::String,
        0x1B => HapFormat::Data,
        _ => return None,
    })
}

/// BT-SIG GATT unit UUID (16-bit) mapped to the HAP unit string used in
/// the attribute database's `unit` field.
pub fn hap_unit_from_bt_sig(unit_uuid: u16) -> Option<&'static str> {
    Some(match unit_uuid {
        0x2700 => return None, // unitless
        0x272F => "celsius",
        0x27AD => "percentage",
        0x2763 => "arcdegrees",
        0x2731 => "lux",
        0x2703 => "seconds",
        _ => return None,
    })
}
