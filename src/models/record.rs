use chrono::{DateTime, FixedOffset};

/// One parsed traffic journal entry.
///
/// Records are immutable once constructed; the record sequence owns them
/// and every analysis pass works on shared references.
#[derive(Debug, Clone)]
pub struct TrafficRecord {
    pub timestamp: DateTime<FixedOffset>,
    /// Source user name, may be empty.
    pub source_user: String,
    pub source_ip: String,
    pub source_port: u16,
    /// Destination user name, may be empty.
    pub dest_user: String,
    pub dest_ip: String,
    pub dest_port: u16,
    /// Bytes received from the source side.
    pub bytes_in: u64,
    /// Bytes sent toward the destination side.
    pub bytes_out: u64,
}

impl TrafficRecord {
    /// The (dest-user, dest-IP, dest-port) tuple identifying the request
    /// target. Two records are the same request pattern iff their
    /// signatures are equal.
    pub fn destination_signature(&self) -> DestinationSignature<'_> {
        DestinationSignature {
            dest_user: &self.dest_user,
            dest_ip: &self.dest_ip,
            dest_port: self.dest_port,
        }
    }

    /// Whether the record targets one of the web ports the periodic and
    /// request-count passes care about.
    pub fn is_web_request(&self) -> bool {
        self.dest_port == 80 || self.dest_port == 443
    }
}

/// Derived key identifying a request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationSignature<'a> {
    pub dest_user: &'a str,
    pub dest_ip: &'a str,
    pub dest_port: u16,
}

/// Ordered sequence of records, insertion order significant. Built once
/// by ingestion and never mutated during analysis.
pub type RecordSequence = Vec<TrafficRecord>;
