//! SRP-6a client (spec §4.3): RFC 5054 group 15 (3072-bit), SHA-512,
//! username `Pair-Setup`.
//!
//! `srp`'s only published release is a pre-1.0 release candidate with
//! an API that cannot be pinned with confidence without running the
//! toolchain against it, so this is a direct implementation against
//! `num-bigint`, following the same textbook SRP-6a construction (and
//! RFC 5054 group-15 constant) a close HAP-sibling protocol's pairing
//! module uses for its own client-side SRP math.

use hap_core::{Error, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

/// RFC 5054 3072-bit group (group 15), stored as its 384-byte big-endian form.
const N_HEX: &str = "\
FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E08\
8A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B\
302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9\
A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE6\
49286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8\
FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D\
670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C\
180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D\
04507A33A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7D\
B3970F85A6E1E4C7ABF5AE8CDB0933D71E8C94E04A25619DCEE3D226\
1AD2EE6BF12FFA06D98A0864D87602733EC86A64521F2B18177B200C\
BBE117577A615D6C770988C0BAD946E208E24FA074E5AB3143DB5BFC\
E0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF";

const N_BYTE_LEN: usize = 384;
const PRIVATE_KEY_LEN: usize = 32;

/// The SRP user name HAP uses for every Pair-Setup ceremony.
pub const SRP_USERNAME: &[u8] = b"Pair-Setup";

fn group_n() -> BigUint {
    BigUint::parse_bytes(N_HEX.as_bytes(), 16).expect("static RFC 5054 group-15 constant")
}

fn group_g() -> BigUint {
    BigUint::from(5u32)
}

fn pad(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes.to_vec();
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

fn sha512(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// `k = H(N, PAD(g))` (RFC 5054 multiplier parameter).
fn compute_k(n: &BigUint, g: &BigUint) -> BigUint {
    let digest = sha512(&[&n.to_bytes_be(), &pad(&g.to_bytes_be(), N_BYTE_LEN)]);
    BigUint::from_bytes_be(&digest)
}

/// `x = H(salt, H(username, ":", password))`.
fn compute_x(username: &[u8], password: &[u8], salt: &[u8]) -> BigUint {
    let inner = sha512(&[username, b":", password]);
    let outer = sha512(&[salt, &inner]);
    BigUint::from_bytes_be(&outer)
}

/// `u = H(PAD(A), PAD(B))`.
fn compute_u(a_pub: &BigUint, b_pub: &BigUint) -> BigUint {
    let digest = sha512(&[
        &pad(&a_pub.to_bytes_be(), N_BYTE_LEN),
        &pad(&b_pub.to_bytes_be(), N_BYTE_LEN),
    ]);
    BigUint::from_bytes_be(&digest)
}

/// `M1 = H(H(N) XOR H(g), H(username), salt, A, B, K)`.
fn compute_m1(username: &[u8], salt: &[u8], a_pub: &BigUint, b_pub: &BigUint, session_key: &[u8]) -> Vec<u8> {
    let h_n = sha512(&[&group_n().to_bytes_be()]);
    let h_g = sha512(&[&group_g().to_bytes_be()]);
    let xor: Vec<u8> = h_n.iter().zip(h_g.iter()).map(|(a, b)| a ^ b).collect();
    let h_username = sha512(&[username]);

    sha512(&[
        &xor,
        &h_username,
        salt,
        &a_pub.to_bytes_be(),
        &b_pub.to_bytes_be(),
        session_key,
    ])
}

/// `M2 = H(A, M1, K)`.
fn compute_m2(a_pub: &BigUint, client_proof: &[u8], session_key: &[u8]) -> Vec<u8> {
    sha512(&[&a_pub.to_bytes_be(), client_proof, session_key])
}

/// The controller side of an SRP-6a exchange, holding only the
/// single-use ephemeral private exponent (raw bytes are zeroized).
pub struct SrpClient {
    private_a_bytes: Zeroizing<Vec<u8>>,
    public_a: BigUint,
}

/// The values a Pair-Setup M3 needs once the premaster secret is computed.
pub struct SrpPremaster {
    pub session_key: Vec<u8>,
    pub client_proof: Vec<u8>,
}

impl SrpClient {
    /// Generate a fresh 32-byte private exponent and its public key `A`.
    pub fn new() -> Self {
        let mut bytes = vec![0u8; PRIVATE_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        let a = BigUint::from_bytes_be(&bytes);
        let public_a = group_g().modpow(&a, &group_n());
        Self {
            private_a_bytes: Zeroizing::new(bytes),
            public_a,
        }
    }

    /// `A`, padded to the 384-byte group width, for the M3 TLV.
    pub fn public_key(&self) -> Vec<u8> {
        pad(&self.public_a.to_bytes_be(), N_BYTE_LEN)
    }

    /// Compute the premaster secret and client proof `M1` from the
    /// server's M2 `(salt, B)` and the user-entered PIN.
    pub fn compute_premaster(&self, password: &[u8], salt: &[u8], server_public: &[u8]) -> Result<SrpPremaster> {
        let n = group_n();
        let g = group_g();
        let b_pub = BigUint::from_bytes_be(server_public);

        if b_pub.is_zero() || &b_pub % &n == BigUint::zero() {
            return Err(Error::auth("SRP server public key B is degenerate (0 mod N)"));
        }

        let u = compute_u(&self.public_a, &b_pub);
        if u.is_zero() {
            return Err(Error::auth("SRP scrambling parameter u is zero"));
        }

        let k = compute_k(&n, &g);
        let x = compute_x(SRP_USERNAME, password, salt);

        let k_gx = (&k * g.modpow(&x, &n)) % &n;
        let base = if b_pub >= k_gx {
            (&b_pub - &k_gx) % &n
        } else {
            (&n + &b_pub - &k_gx) % &n
        };

        let a = BigUint::from_bytes_be(&self.private_a_bytes);
        let exponent = &a + (&u * &x);
        let premaster = base.modpow(&exponent, &n);

        let session_key = sha512(&[&premaster.to_bytes_be()]);
        let client_proof = compute_m1(SRP_USERNAME, salt, &self.public_a, &b_pub, &session_key);

        Ok(SrpPremaster {
            session_key,
            client_proof,
        })
    }

    /// Verify the server's M4 proof `M2` against our own computed values.
    pub fn verify_server_proof(&self, session_key: &[u8], client_proof: &[u8], server_proof: &[u8]) -> Result<()> {
        let expected = compute_m2(&self.public_a, client_proof, session_key);
        if expected == server_proof {
            Ok(())
        } else {
            Err(Error::auth("SRP server proof (M2) did not match"))
        }
    }
}

impl Default for SrpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mirrors the client math with an independent server-side SRP-6a
    /// computation, confirming both sides converge on the same K/M1/M2.
    struct MockAccessorySrp {
        n: BigUint,
        g: BigUint,
        k: BigUint,
        v: BigUint,
        b: BigUint,
        b_pub: BigUint,
    }

    impl MockAccessorySrp {
        fn new(password: &[u8], salt: &[u8]) -> Self {
            let n = group_n();
            let g = group_g();
            let k = compute_k(&n, &g);
            let x = compute_x(SRP_USERNAME, password, salt);
            let v = g.modpow(&x, &n);

            let mut b_bytes = vec![0u8; PRIVATE_KEY_LEN];
            rand::thread_rng().fill_bytes(&mut b_bytes);
            let b = BigUint::from_bytes_be(&b_bytes);
            let b_pub = (&k * &v + g.modpow(&b, &n)) % &n;

            Self { n, g, k, v, b, b_pub }
        }

        fn public_key(&self) -> Vec<u8> {
            pad(&self.b_pub.to_bytes_be(), N_BYTE_LEN)
        }

        fn session_key_and_proof(&self, a_pub_bytes: &[u8], client_proof: &[u8]) -> (Vec<u8>, Vec<u8>) {
            let a_pub = BigUint::from_bytes_be(a_pub_bytes);
            let u = compute_u(&a_pub, &self.b_pub);
            let s = (&a_pub * self.v.modpow(&u, &self.n)).modpow(&self.b, &self.n);
            let session_key = sha512(&[&s.to_bytes_be()]);
            let _ = client_proof; // a real accessory would verify M1 here too
            let m2 = compute_m2(&a_pub, client_proof, &session_key);
            (session_key, m2)
        }
    }

    #[test]
    fn client_and_mock_accessory_converge_on_the_same_session_key() {
        let pin = b"123-45-678";
        let salt = b"0123456789ABCDEF";

        let server = MockAccessorySrp::new(pin, salt);
        let client = SrpClient::new();

        let premaster = client
            .compute_premaster(pin, salt, &server.public_key())
            .unwrap();

        let (server_session_key, server_m2) =
            server.session_key_and_proof(&client.public_key(), &premaster.client_proof);

        assert_eq!(premaster.session_key, server_session_key);
        assert!(client
            .verify_server_proof(&premaster.session_key, &premaster.client_proof, &server_m2)
            .is_ok());
    }

    #[test]
    fn wrong_pin_produces_a_mismatched_proof() {
        let salt = b"0123456789ABCDEF";
        let server = MockAccessorySrp::new(b"123-45-678", salt);
        let client = SrpClient::new();

        let premaster = client
            .compute_premaster(b"000-00-000", salt, &server.public_key())
            .unwrap();
        let (server_session_key, server_m2) =
            server.session_key_and_proof(&client.public_key(), &premaster.client_proof);

        // The two sides derived different premasters, so the accessory's M2
        // (computed under its own session key) won't match what we expect.
        assert_ne!(premaster.session_key, server_session_key);
        assert!(client
            .verify_server_proof(&premaster.session_key, &premaster.client_proof, &server_m2)
            .is_err());
    }

    #[test]
    fn degenerate_server_public_key_is_rejected() {
        let client = SrpClient::new();
        let zero_b = vec![0u8; N_BYTE_LEN];
        assert!(client.compute_premaster(b"123-45-678", b"salt", &zero_b).is_err());
    }
}
