//! Wire message schema.
//!
//! `Packet` is the sole message that crosses the wire. It is encoded with
//! `prost`'s Protocol Buffers derive so that clearing a field reproduces
//! proto3's "omit default" behavior — this is what makes the canonical
//! signing bytes in [`signing_bytes`] well-defined (see §4.2 of the spec).

use prost::Message;

/// `typ = 0`: a request/ask from one agent to another (or to the server).
pub const TYPE_ASK: u32 = 0;
/// `typ = 1`: a reply/offer, always sent by the server or forwarded verbatim.
pub const TYPE_OFFER: u32 = 1;
/// `typ = 2`: a liveness heartbeat, sent by the server only.
pub const TYPE_HEARTBEAT: u32 = 2;

/// Hard cap on a framed payload, enforced by the frame codec in both
/// directions. A packet larger than this terminates the connection.
pub const MAX_PACKET_SIZE: usize = 65_536;

/// Required length of an Ed25519 public key.
pub const PUBKEY_LEN: usize = 32;
/// Required length of an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// The one wire message. Field numbers are fixed per the spec and must
/// never be renumbered — clients and the relay must agree byte-for-byte.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Packet {
    /// Ed25519 signature over [`signing_bytes`]. Required on input.
    #[prost(bytes = "vec", tag = "1")]
    pub sig: Vec<u8>,
    /// Sender's Ed25519 public key. Required on input.
    #[prost(bytes = "vec", tag = "2")]
    pub pk: Vec<u8>,
    /// Message kind: see `TYPE_ASK` / `TYPE_OFFER` / `TYPE_HEARTBEAT`.
    #[prost(uint32, tag = "3")]
    pub typ: u32,
    /// Correlation token, echoed verbatim in server replies.
    #[prost(string, tag = "4")]
    pub id: String,
    /// Declared sender identity, conventionally `"kind:name"`.
    #[prost(string, tag = "5")]
    pub src: String,
    /// Destination selector: `""`/`"server"`, `"discover:<suffix>"`, or an identity.
    #[prost(string, tag = "6")]
    pub dst: String,
    /// Opaque UTF-8 payload.
    #[prost(string, tag = "7")]
    pub body: String,
    /// Transported unmodified; no policy is enforced on it here.
    #[prost(uint64, tag = "8")]
    pub fee: u64,
    /// Transported unmodified; no policy is enforced on it here.
    #[prost(uint32, tag = "9")]
    pub ttl: u32,
    /// Optional memory-commit blob, counted but otherwise opaque.
    #[prost(bytes = "vec", tag = "10")]
    pub scar: Vec<u8>,
}

impl Packet {
    /// Build a server-originated reply: `typ=1`, `src="server"`, echoing `id`.
    pub fn server_reply(id: &str, body: impl Into<String>) -> Self {
        Self {
            sig: Vec::new(),
            pk: Vec::new(),
            typ: TYPE_OFFER,
            id: id.to_string(),
            src: "server".to_string(),
            dst: String::new(),
            body: body.into(),
            fee: 0,
            ttl: 0,
            scar: Vec::new(),
        }
    }

    /// Build the heartbeat packet sent to every registered connection.
    pub fn heartbeat() -> Self {
        Self {
            sig: Vec::new(),
            pk: Vec::new(),
            typ: TYPE_HEARTBEAT,
            id: String::new(),
            src: "server".to_string(),
            dst: String::new(),
            body: String::new(),
            fee: 0,
            ttl: 0,
            scar: Vec::new(),
        }
    }

    /// The canonical signing payload: this packet with `sig`/`pk` cleared to
    /// their proto3 default (empty bytes, hence omitted on the wire) and
    /// every other field copied verbatim, then re-encoded. §4.2 of the spec.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let unsigned = Packet {
            sig: Vec::new(),
            pk: Vec::new(),
            ..self.clone()
        };
        unsigned.encode_to_vec()
    }

    /// Encode this packet using the canonical wire encoding (full message,
    /// signature included — used for framing outbound bytes).
    pub fn encode_packet(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Decode a packet from a received frame payload.
    pub fn decode_packet(buf: &[u8]) -> Result<Self, prost::DecodeError> {
        Packet::decode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_bytes_omit_sig_and_pk() {
        let p = Packet {
            sig: vec![9; SIGNATURE_LEN],
            pk: vec![7; PUBKEY_LEN],
            typ: TYPE_ASK,
            id: "x1".into(),
            src: "bot:a".into(),
            dst: "server".into(),
            body: "hello".into(),
            fee: 5,
            ttl: 10,
            scar: Vec::new(),
        };
        let signing = p.signing_bytes();
        let cleared = Packet {
            sig: Vec::new(),
            pk: Vec::new(),
            ..p.clone()
        };
        assert_eq!(signing, cleared.encode_to_vec());
        // sig/pk bytes must not leak into the signing payload.
        assert!(!contains_subslice(&signing, &[9; SIGNATURE_LEN]));
        assert!(!contains_subslice(&signing, &[7; PUBKEY_LEN]));
    }

    #[test]
    fn roundtrip_through_decode() {
        let p = Packet::server_reply("abc", "done");
        let bytes = p.encode_packet();
        let back = Packet::decode_packet(&bytes).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn forward_preserves_every_field() {
        let p = Packet {
            sig: vec![1; SIGNATURE_LEN],
            pk: vec![2; PUBKEY_LEN],
            typ: TYPE_ASK,
            id: "x2".into(),
            src: "bot:b".into(),
            dst: "bot:a".into(),
            body: "hi".into(),
            fee: 1,
            ttl: 2,
            scar: vec![3, 4, 5],
        };
        let bytes = p.encode_packet();
        let back = Packet::decode_packet(&bytes).unwrap();
        assert_eq!(p, back);
    }

    fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }
}
