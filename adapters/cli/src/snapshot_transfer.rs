#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};

use aquarium_core::snapshot::TankSnapshot;

const SNAPSHOT_DOMAIN: &str = "aqua";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "aqua:v1";
/// Delimiter used to separate the prefix, tank dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Largest header-versus-payload dimension drift tolerated when decoding.
const DIMENSION_TOLERANCE: f32 = 0.01;

/// Complete tank capture wrapped for single-line text transfer.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TankTransfer {
    /// Simulation state carried by the transfer string.
    pub snapshot: TankSnapshot,
}

impl TankTransfer {
    /// Encodes the capture into a single-line string suitable for clipboard
    /// transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let json =
            serde_json::to_vec(&self.snapshot).expect("tank snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.snapshot.dimensions.width(),
            self.snapshot.dimensions.height()
        )
    }

    /// Decodes a capture from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, SnapshotTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(SnapshotTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(SnapshotTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(SnapshotTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(SnapshotTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SnapshotTransferError::InvalidEncoding)?;
        let snapshot: TankSnapshot =
            serde_json::from_slice(&bytes).map_err(SnapshotTransferError::InvalidPayload)?;

        if (snapshot.dimensions.width() - width).abs() > DIMENSION_TOLERANCE
            || (snapshot.dimensions.height() - height).abs() > DIMENSION_TOLERANCE
        {
            return Err(SnapshotTransferError::DimensionMismatch {
                header: (width, height),
                payload: (snapshot.dimensions.width(), snapshot.dimensions.height()),
            });
        }

        Ok(Self { snapshot })
    }
}

/// Errors that can occur while decoding snapshot transfer strings.
#[derive(Debug)]
pub(crate) enum SnapshotTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include tank dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The tank dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The header dimensions disagree with the payload dimensions.
    DimensionMismatch {
        /// Dimensions parsed from the header segment.
        header: (f32, f32),
        /// Dimensions carried inside the payload.
        payload: (f32, f32),
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for SnapshotTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "snapshot payload was empty"),
            Self::MissingPrefix => write!(f, "snapshot string is missing the prefix"),
            Self::MissingVersion => write!(f, "snapshot string is missing the version"),
            Self::MissingDimensions => {
                write!(f, "snapshot string is missing the tank dimensions")
            }
            Self::MissingPayload => write!(f, "snapshot string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "snapshot prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "snapshot version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse tank dimensions '{dimensions}'")
            }
            Self::DimensionMismatch { header, payload } => {
                write!(
                    f,
                    "header dimensions {}x{} disagree with payload dimensions {}x{}",
                    header.0, header.1, payload.0, payload.1
                )
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode snapshot payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse snapshot payload: {error}")
            }
        }
    }
}

impl Error for SnapshotTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(f32, f32), SnapshotTransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| SnapshotTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<f32>()
        .map_err(|_| SnapshotTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<f32>()
        .map_err(|_| SnapshotTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(SnapshotTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_world::Tank;

    #[test]
    fn round_trip_fresh_tank() {
        let transfer = TankTransfer {
            snapshot: Tank::new().snapshot(),
        };

        let encoded = transfer.encode();
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:16x9:")));

        let decoded = TankTransfer::decode(&encoded).expect("snapshot decodes");
        assert_eq!(transfer, decoded);
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(matches!(
            TankTransfer::decode("   "),
            Err(SnapshotTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn decode_rejects_foreign_prefix() {
        assert!(matches!(
            TankTransfer::decode("maze:v1:4x4:e30"),
            Err(SnapshotTransferError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn decode_rejects_unsupported_version() {
        assert!(matches!(
            TankTransfer::decode("aqua:v2:16x9:e30"),
            Err(SnapshotTransferError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn decode_rejects_unparseable_dimensions() {
        assert!(matches!(
            TankTransfer::decode("aqua:v1:wide:e30"),
            Err(SnapshotTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            TankTransfer::decode("aqua:v1:0x9:e30"),
            Err(SnapshotTransferError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn decode_rejects_header_payload_disagreement() {
        let transfer = TankTransfer {
            snapshot: Tank::new().snapshot(),
        };
        let encoded = transfer.encode();
        let payload = encoded
            .splitn(4, ':')
            .nth(3)
            .expect("encoded string has a payload");
        let forged = format!("{SNAPSHOT_HEADER}:40x9:{payload}");

        assert!(matches!(
            TankTransfer::decode(&forged),
            Err(SnapshotTransferError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn decode_rejects_corrupt_base64() {
        assert!(matches!(
            TankTransfer::decode("aqua:v1:16x9:!!notbase64!!"),
            Err(SnapshotTransferError::InvalidEncoding(_))
        ));
    }
}
