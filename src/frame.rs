//! PN532 frame construction and InListPassiveTarget reply decoding.
//!
//! Outbound frames use the normal information frame layout:
//!
//! ```text
//! 00 00 FF LEN LCS D4 CMD PARAMS.. DCS 00
//! ```
//!
//! Replies are read in a fixed time window rather than frame by frame, so the
//! decoder searches the window for the reply marker and bounds-checks every
//! offset it derives from a length byte.

use crate::types::{FrameError, Uid, UID_MAX_LEN, UID_MIN_LEN};

const PREAMBLE: u8 = 0x00;
const START_CODE: [u8; 2] = [0x00, 0xFF];
const POSTAMBLE: u8 = 0x00;
const TFI_HOST_TO_PN532: u8 = 0xD4;
const TFI_PN532_TO_HOST: u8 = 0xD5;

/// SAMConfiguration, used as the payload of the wake sequence
pub const CMD_SAM_CONFIGURATION: u8 = 0x14;
pub const CMD_IN_LIST_PASSIVE_TARGET: u8 = 0x4A;

/// Reply marker: TFI followed by InListPassiveTarget + 1
pub const RESPONSE_MARKER: [u8; 2] = [TFI_PN532_TO_HOST, CMD_IN_LIST_PASSIVE_TARGET + 1];

/// Wake preamble followed by SAMConfiguration(normal mode)
const WAKE_SEQUENCE: [u8; 24] = [
    0x55, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0x03, 0xFD, 0xD4, 0x14, 0x01, 0x17, 0x00,
];

/// InListPassiveTarget, MaxTg = 1, BrTy = 106 kbps Type A
const DETECT_TARGET_COMMAND: [u8; 11] = [
    0x00, 0x00, 0xFF, 0x04, 0xFC, 0xD4, 0x4A, 0x01, 0x00, 0xE1, 0x00,
];

// Offsets relative to the marker start
const NB_TG_OFFSET: usize = 2;
const UID_LEN_OFFSET: usize = 7;
const UID_OFFSET: usize = 8;

/// Bytes that end the chip's low-power state. The chip's answer is not checked.
pub fn wake_sequence() -> &'static [u8] {
    &WAKE_SEQUENCE
}

/// Pre-checksummed request to detect one Type A target at 106 kbps
pub fn detect_target_command() -> &'static [u8] {
    &DETECT_TARGET_COMMAND
}

/// Build a host-to-chip information frame for `command` with `params`.
///
/// `params` must fit the single-byte LEN field (at most 253 bytes).
pub fn information_frame(command: u8, params: &[u8]) -> Vec<u8> {
    let len = (params.len() + 2) as u8;
    let lcs = len.wrapping_neg();
    let dcs = [TFI_HOST_TO_PN532, command]
        .iter()
        .chain(params.iter())
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg();

    let mut frame = Vec::with_capacity(params.len() + 9);
    frame.push(PREAMBLE);
    frame.extend_from_slice(&START_CODE);
    frame.push(len);
    frame.push(lcs);
    frame.push(TFI_HOST_TO_PN532);
    frame.push(command);
    frame.extend_from_slice(params);
    frame.push(dcs);
    frame.push(POSTAMBLE);
    frame
}

/// Index of the first `D5 4B` in `buf`
pub fn locate_response_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(RESPONSE_MARKER.len())
        .position(|w| w == RESPONSE_MARKER)
}

/// Decode the first target's UID from an InListPassiveTarget reply window.
///
/// Layout after the marker: `NbTg Tg SENS_RES(2) SEL_RES UIDLen UID..`
pub fn parse_uid(buf: &[u8]) -> Result<Uid, FrameError> {
    if buf.is_empty() {
        return Err(FrameError::NoData);
    }

    let p = locate_response_marker(buf).ok_or(FrameError::NoMarker)?;
    let frame = &buf[p..];

    if frame.len() < UID_OFFSET {
        return Err(FrameError::TruncatedFrame);
    }

    if frame[NB_TG_OFFSET] < 1 {
        return Err(FrameError::ZeroTargets);
    }

    let uid_len = frame[UID_LEN_OFFSET];
    if !(UID_MIN_LEN..=UID_MAX_LEN).contains(&(uid_len as usize)) {
        return Err(FrameError::InvalidUidLength(uid_len));
    }

    let uid = frame
        .get(UID_OFFSET..UID_OFFSET + uid_len as usize)
        .ok_or(FrameError::TruncatedFrame)?;

    Uid::new(uid).ok_or(FrameError::InvalidUidLength(uid_len))
}

/// [`parse_uid`] without the failure reason
pub fn extract_uid(buf: &[u8]) -> Option<Uid> {
    parse_uid(buf).ok()
}
