//! QPACK static table per RFC 9204 Appendix A.
//!
//! 99 predefined header field entries, 0-based. Contents and order are part
//! of the wire protocol and must never change.

use crate::field::HeaderField;
use std::collections::HashMap;

macro_rules! field {
    ($name:expr, $value:expr) => {
        HeaderField {
            name: $name,
            value: $value,
        }
    };
}

/// The QPACK static table (indexes 0-98).
pub static STATIC_TABLE: &[HeaderField] = &[
    field!(b":authority", b""),                                              // 0
    field!(b":path", b"/"),                                                  // 1
    field!(b"age", b"0"),                                                    // 2
    field!(b"content-disposition", b""),                                     // 3
    field!(b"content-length", b"0"),                                         // 4
    field!(b"cookie", b""),                                                  // 5
    field!(b"date", b""),                                                    // 6
    field!(b"etag", b""),                                                    // 7
    field!(b"if-modified-since", b""),                                       // 8
    field!(b"if-none-match", b""),                                           // 9
    field!(b"last-modified", b""),                                           // 10
    field!(b"link", b""),                                                    // 11
    field!(b"location", b""),                                                // 12
    field!(b"referer", b""),                                                 // 13
    field!(b"set-cookie", b""),                                              // 14
    field!(b":method", b"CONNECT"),                                          // 15
    field!(b":method", b"DELETE"),                                           // 16
    field!(b":method", b"GET"),                                              // 17
    field!(b":method", b"HEAD"),                                             // 18
    field!(b":method", b"OPTIONS"),                                          // 19
    field!(b":method", b"POST"),                                             // 20
    field!(b":method", b"PUT"),                                              // 21
    field!(b":scheme", b"http"),                                             // 22
    field!(b":scheme", b"https"),                                            // 23
    field!(b":status", b"103"),                                              // 24
    field!(b":status", b"200"),                                              // 25
    field!(b":status", b"304"),                                              // 26
    field!(b":status", b"404"),                                              // 27
    field!(b":status", b"503"),                                              // 28
    field!(b"accept", b"*/*"),                                               // 29
    field!(b"accept", b"application/dns-message"),                           // 30
    field!(b"accept-encoding", b"gzip, deflate, br"),                        // 31
    field!(b"accept-ranges", b"bytes"),                                      // 32
    field!(b"access-control-allow-headers", b"cache-control"),               // 33
    field!(b"access-control-allow-headers", b"content-type"),                // 34
    field!(b"access-control-allow-origin", b"*"),                            // 35
    field!(b"cache-control", b"max-age=0"),                                  // 36
    field!(b"cache-control", b"max-age=2592000"),                            // 37
    field!(b"cache-control", b"max-age=604800"),                             // 38
    field!(b"cache-control", b"no-cache"),                                   // 39
    field!(b"cache-control", b"no-store"),                                   // 40
    field!(b"cache-control", b"public, max-age=31536000"),                   // 41
    field!(b"content-encoding", b"br"),                                      // 42
    field!(b"content-encoding", b"gzip"),                                    // 43
    field!(b"content-type", b"application/dns-message"),                     // 44
    field!(b"content-type", b"application/javascript"),                      // 45
    field!(b"content-type", b"application/json"),                            // 46
    field!(b"content-type", b"application/x-www-form-urlencoded"),           // 47
    field!(b"content-type", b"image/gif"),                                   // 48
    field!(b"content-type", b"image/jpeg"),                                  // 49
    field!(b"content-type", b"image/png"),                                   // 50
    field!(b"content-type", b"text/css"),                                    // 51
    field!(b"content-type", b"text/html; charset=utf-8"),                    // 52
    field!(b"content-type", b"text/plain"),                                  // 53
    field!(b"content-type", b"text/plain;charset=utf-8"),                    // 54
    field!(b"range", b"bytes=0-"),                                           // 55
    field!(b"strict-transport-security", b"max-age=31536000"),               // 56
    field!(b"strict-transport-security", b"max-age=31536000; includesubdomains"), // 57
    field!(b"strict-transport-security", b"max-age=31536000; includesubdomains; preload"), // 58
    field!(b"vary", b"accept-encoding"),                                     // 59
    field!(b"vary", b"origin"),                                              // 60
    field!(b"x-content-type-options", b"nosniff"),                           // 61
    field!(b"x-xss-protection", b"1; mode=block"),                           // 62
    field!(b":status", b"100"),                                              // 63
    field!(b":status", b"204"),                                              // 64
    field!(b":status", b"206"),                                              // 65
    field!(b":status", b"302"),                                              // 66
    field!(b":status", b"400"),                                              // 67
    field!(b":status", b"403"),                                              // 68
    field!(b":status", b"421"),                                              // 69
    field!(b":status", b"425"),                                              // 70
    field!(b":status", b"500"),                                              // 71
    field!(b"accept-language", b""),                                         // 72
    field!(b"access-control-allow-credentials", b"FALSE"),                   // 73
    field!(b"access-control-allow-credentials", b"TRUE"),                    // 74
    field!(b"access-control-allow-headers", b"*"),                           // 75
    field!(b"access-control-allow-methods", b"get"),                         // 76
    field!(b"access-control-allow-methods", b"get, post, options"),          // 77
    field!(b"access-control-allow-methods", b"options"),                     // 78
    field!(b"access-control-expose-headers", b"content-length"),             // 79
    field!(b"access-control-request-headers", b"content-type"),              // 80
    field!(b"access-control-request-method", b"get"),                        // 81
    field!(b"access-control-request-method", b"post"),                       // 82
    field!(b"alt-svc", b"clear"),                                            // 83
    field!(b"authorization", b""),                                           // 84
    field!(b"content-security-policy", b"script-src 'none'; object-src 'none'; base-uri 'none'"), // 85
    field!(b"early-data", b"1"),                                             // 86
    field!(b"expect-ct", b""),                                               // 87
    field!(b"forwarded", b""),                                               // 88
    field!(b"if-range", b""),                                                // 89
    field!(b"origin", b""),                                                  // 90
    field!(b"purpose", b"prefetch"),                                         // 91
    field!(b"server", b""),                                                  // 92
    field!(b"timing-allow-origin", b"*"),                                    // 93
    field!(b"upgrade-insecure-requests", b"1"),                              // 94
    field!(b"user-agent", b""),                                              // 95
    field!(b"x-forwarded-for", b""),                                         // 96
    field!(b"x-frame-options", b"deny"),                                     // 97
    field!(b"x-frame-options", b"sameorigin"),                               // 98
];

/// Lookup maps derived from the table, built once on first use.
struct Lookup {
    name: HashMap<&'static [u8], usize>,
    status: HashMap<u16, usize>,
    method: HashMap<&'static [u8], usize>,
}

impl Lookup {
    fn new() -> Self {
        let mut name = HashMap::new();
        let mut status = HashMap::new();
        let mut method = HashMap::new();

        for (idx, entry) in STATIC_TABLE.iter().enumerate() {
            name.entry(entry.name).or_insert(idx);

            if entry.name == b":status" {
                if let Some(code) = std::str::from_utf8(entry.value)
                    .ok()
                    .and_then(|s| s.parse::<u16>().ok())
                {
                    status.insert(code, idx);
                }
            }
            // CONNECT stays out of the method shortcut map: CONNECT requests
            // carry no :scheme/:path and take a different encode path.
            if entry.name == b":method" && entry.value != b"CONNECT" {
                method.insert(entry.value, idx);
            }
        }

        Self {
            name,
            status,
            method,
        }
    }
}

lazy_static::lazy_static! {
    static ref LOOKUP: Lookup = Lookup::new();
}

/// Get a static table entry by index. `None` if out of bounds.
#[inline]
pub fn get(index: usize) -> Option<&'static HeaderField> {
    STATIC_TABLE.get(index)
}

/// Total number of static table entries.
#[inline]
pub const fn count() -> usize {
    99
}

/// Index of the `:status` entry for `code`, when one exists.
#[inline]
pub fn status_index(code: u16) -> Option<usize> {
    LOOKUP.status.get(&code).copied()
}

/// Index of the `:method` entry for `method`, when one exists.
/// CONNECT is deliberately absent.
#[inline]
pub fn method_index(method: &[u8]) -> Option<usize> {
    LOOKUP.method.get(method).copied()
}

/// Index of the entry matching both name and value, when one exists.
///
/// Entries sharing a name are not contiguous (`:status` spans two runs),
/// so this scans the whole table. 99 entries; fine for encode-time use.
pub fn find_exact(name: &[u8], value: &[u8]) -> Option<usize> {
    STATIC_TABLE
        .iter()
        .position(|e| e.name == name && e.value == value)
}

/// Index of the first entry whose name matches, when one exists.
#[inline]
pub fn find_name(name: &[u8]) -> Option<usize> {
    LOOKUP.name.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        assert_eq!(STATIC_TABLE.len(), 99);
        assert_eq!(count(), 99);
    }

    #[test]
    fn test_index_stability() {
        // Index assignments are protocol constants.
        let entry = get(0).unwrap();
        assert_eq!(entry.name, b":authority");
        assert_eq!(entry.value, b"");

        let entry = get(17).unwrap();
        assert_eq!(entry.name, b":method");
        assert_eq!(entry.value, b"GET");

        let entry = get(25).unwrap();
        assert_eq!(entry.name, b":status");
        assert_eq!(entry.value, b"200");

        assert!(get(99).is_none());
    }

    #[test]
    fn test_status_index() {
        for (code, idx) in [
            (100u16, 63usize),
            (103, 24),
            (200, 25),
            (204, 64),
            (206, 65),
            (302, 66),
            (304, 26),
            (400, 67),
            (403, 68),
            (404, 27),
            (421, 69),
            (425, 70),
            (500, 71),
            (503, 28),
        ] {
            assert_eq!(status_index(code), Some(idx), "status {}", code);
        }
        assert_eq!(status_index(418), None);
    }

    #[test]
    fn test_method_index() {
        assert_eq!(method_index(b"DELETE"), Some(16));
        assert_eq!(method_index(b"GET"), Some(17));
        assert_eq!(method_index(b"HEAD"), Some(18));
        assert_eq!(method_index(b"OPTIONS"), Some(19));
        assert_eq!(method_index(b"POST"), Some(20));
        assert_eq!(method_index(b"PUT"), Some(21));
        // In the table, but not in the shortcut map.
        assert_eq!(method_index(b"CONNECT"), None);
        assert_eq!(find_exact(b":method", b"CONNECT"), Some(15));
    }

    #[test]
    fn test_reverse_maps() {
        assert_eq!(find_exact(b":method", b"GET"), Some(17));
        assert_eq!(find_exact(b":status", b"200"), Some(25));
        assert_eq!(find_exact(b"x-nope", b""), None);
        assert_eq!(find_name(b":method"), Some(15));
        assert_eq!(find_name(b"content-type"), Some(44));
        assert_eq!(find_name(b"x-nope"), None);
    }
}
