use byteorder::{ByteOrder, LittleEndian};

use crate::error::GltfError;

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;
const CHUNK_TYPE_BIN: u32 = 0x004E_4942;
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// The JSON and BIN chunk views of a validated GLB container (spec §4.C).
/// Both are subranges of the input buffer; no copy is made.
pub struct Glb<'a> {
    pub json: &'a [u8],
    pub bin: &'a [u8],
}

/// Validates a GLB container's header and chunk layout and returns views
/// onto its JSON and BIN chunks. All multibyte integers are little-endian.
pub fn parse_glb(input: &[u8]) -> Result<Glb<'_>, GltfError> {
    if input.len() < HEADER_LEN {
        return Err(GltfError::GlbMalformed("input too small for GLB header".into()));
    }

    let magic = LittleEndian::read_u32(&input[0..4]);
    if magic != GLB_MAGIC {
        return Err(GltfError::GlbMalformed(format!(
            "invalid magic 0x{magic:08x}"
        )));
    }
    let total_length = LittleEndian::read_u32(&input[8..12]) as usize;
    if total_length > input.len() {
        return Err(GltfError::GlbMalformed(
            "declared total_length exceeds input size".into(),
        ));
    }
    let input = &input[..total_length];

    let json_header_offset = HEADER_LEN;
    if json_header_offset + CHUNK_HEADER_LEN > input.len() {
        return Err(GltfError::GlbMalformed(
            "input too small for JSON chunk header".into(),
        ));
    }
    let json_length =
        LittleEndian::read_u32(&input[json_header_offset..json_header_offset + 4]) as usize;
    let json_type =
        LittleEndian::read_u32(&input[json_header_offset + 4..json_header_offset + 8]);
    if json_type != CHUNK_TYPE_JSON {
        return Err(GltfError::GlbMalformed(format!(
            "expected JSON chunk type, found 0x{json_type:08x}"
        )));
    }
    let json_data_offset = json_header_offset + CHUNK_HEADER_LEN;
    if json_data_offset + json_length > input.len() {
        return Err(GltfError::GlbMalformed(
            "JSON chunk payload out of bounds".into(),
        ));
    }
    let json = &input[json_data_offset..json_data_offset + json_length];

    let bin_header_offset = json_data_offset + json_length;
    if bin_header_offset + CHUNK_HEADER_LEN > input.len() {
        return Err(GltfError::GlbMalformed(
            "input too small for BIN chunk header".into(),
        ));
    }
    let bin_length =
        LittleEndian::read_u32(&input[bin_header_offset..bin_header_offset + 4]) as usize;
    let bin_type = LittleEndian::read_u32(&input[bin_header_offset + 4..bin_header_offset + 8]);
    if bin_type != CHUNK_TYPE_BIN {
        return Err(GltfError::GlbMalformed(format!(
            "expected BIN chunk type, found 0x{bin_type:08x}"
        )));
    }
    let bin_data_offset = bin_header_offset + CHUNK_HEADER_LEN;
    if bin_data_offset + bin_length > input.len() {
        return Err(GltfError::GlbMalformed(
            "BIN chunk payload out of bounds".into(),
        ));
    }
    let bin = &input[bin_data_offset..bin_data_offset + bin_length];

    Ok(Glb { json, bin })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let total_len = HEADER_LEN + CHUNK_HEADER_LEN + json.len() + CHUNK_HEADER_LEN + bin.len();
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total_len as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
        out.extend_from_slice(json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
        out.extend_from_slice(bin);
        out
    }

    #[test]
    fn parses_valid_four_chunk_layout() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        let bin = b"binary-payload";
        let glb = build_glb(json, bin);

        let parsed = parse_glb(&glb).unwrap();
        assert_eq!(parsed.json, json);
        assert_eq!(parsed.bin, bin);
        assert!(parsed.json.len() + parsed.bin.len() + 24 <= glb.len());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut glb = build_glb(br#"{}"#, b"");
        glb[0] = 0;
        assert!(matches!(parse_glb(&glb), Err(GltfError::GlbMalformed(_))));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(matches!(parse_glb(&[0u8; 4]), Err(GltfError::GlbMalformed(_))));
    }

    #[test]
    fn rejects_bin_payload_extending_past_input() {
        let mut glb = build_glb(br#"{}"#, b"0123456789");
        let len = glb.len() as u32;
        // Claim more BIN bytes than actually present.
        let bin_len_offset = glb.len() - 10 - 8;
        glb[bin_len_offset..bin_len_offset + 4].copy_from_slice(&(len).to_le_bytes());
        assert!(matches!(parse_glb(&glb), Err(GltfError::GlbMalformed(_))));
    }
}
