//! Consistent Overhead Byte Stuffing.
//!
//! COBS removes every `0x00` from a payload so the frame delimiter can
//! never appear inside a chunk body. Runs of non-zero bytes are prefixed
//! with a length code that jumps to the position of the next zero; the
//! final jump is a phantom (it points past the end and restores no zero).
//! Payloads of up to 254 bytes encode into at most 255 bytes.

use heapless::Vec;

/// Maximum payload length a single COBS block can carry.
pub const COBS_PAYLOAD_MAX: usize = 254;

/// Errors that can occur during COBS encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CobsError {
    /// Input too long to encode, or output buffer too small
    InvalidLength,
    /// A jump code points past the end of the encoded input
    OutOfBounds,
}

/// COBS-encode `input` into `output`.
///
/// `output` is cleared first. Inputs over [`COBS_PAYLOAD_MAX`] bytes fail
/// with `InvalidLength` before anything is written.
pub fn encode<const N: usize>(input: &[u8], output: &mut Vec<u8, N>) -> Result<(), CobsError> {
    if input.len() > COBS_PAYLOAD_MAX {
        return Err(CobsError::InvalidLength);
    }
    output.clear();

    // Reserve the first code position, then stream bytes after it
    let mut code_index = 0;
    let mut code: u8 = 1;
    output.push(0).map_err(|_| CobsError::InvalidLength)?;

    for (i, &byte) in input.iter().enumerate() {
        if byte == 0 {
            output[code_index] = code;
            code_index = output.len();
            code = 1;
            output.push(0).map_err(|_| CobsError::InvalidLength)?;
        } else {
            output.push(byte).map_err(|_| CobsError::InvalidLength)?;
            code += 1;
            // A maximal run only opens a new group if input remains;
            // otherwise the 0xFF code is the final one
            if code == 0xFF && i + 1 < input.len() {
                output[code_index] = code;
                code_index = output.len();
                code = 1;
                output.push(0).map_err(|_| CobsError::InvalidLength)?;
            }
        }
    }

    output[code_index] = code;
    Ok(())
}

/// COBS-decode `input` into `output`.
///
/// `output` is cleared first. Fails with `OutOfBounds` on a malformed jump
/// chain (a code of zero, or a jump past the end of the input) and with
/// `InvalidLength` when the decoded payload exceeds the output capacity.
pub fn decode<const N: usize>(input: &[u8], output: &mut Vec<u8, N>) -> Result<(), CobsError> {
    output.clear();
    if input.is_empty() {
        return Ok(());
    }

    let mut read = 0;
    while read < input.len() {
        let code = input[read] as usize;
        if code == 0 {
            // Zero bytes cannot appear inside an encoded block
            return Err(CobsError::OutOfBounds);
        }
        if read + code > input.len() {
            return Err(CobsError::OutOfBounds);
        }
        for offset in 1..code {
            output
                .push(input[read + offset])
                .map_err(|_| CobsError::InvalidLength)?;
        }
        read += code;
        // Every jump except a maximal one or the final (phantom) jump
        // restores the zero byte it replaced
        if code != 0xFF && read != input.len() {
            output.push(0).map_err(|_| CobsError::InvalidLength)?;
        }
    }
    Ok(())
}
