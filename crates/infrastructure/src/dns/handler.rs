//! C4 — DNS Handler: the per-query pipeline described in §4.4.
//!
//! Grounded on the reference implementation's decorator-chain resolver
//! (`dns/resolver/{filtered_resolver.rs,cache_layer.rs}`) — filter, then
//! cache, then forward — collapsed here into the one explicit function
//! the spec's numbered algorithm describes, wired to a `hickory-server`
//! `RequestHandler` the way `cli/server/dns.rs` wires its own handler.

use crate::dns::block_engine::BlockEngine;
use crate::dns::cache::DnsCache;
use crate::dns::captive_portal::CaptivePortalDetector;
use crate::dns::rate_limiter::RateLimiter;
use crate::dns::upstream::UpstreamPool;
use crate::stats::StatsCollector;
use async_trait::async_trait;
use dnshield_application::ports::{BlockEnginePort, FilterDecision};
use dnshield_domain::cache_entry::{CacheKey, CachedRecord, QueryType};
use hickory_proto::op::{Header, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct HandlerConfig {
    pub sinkhole_ipv4: Ipv4Addr,
    pub block_ttl: u32,
    pub upstream_timeout: Duration,
    pub cache_max_ttl: u32,
}

/// The DNS request handler hickory-server dispatches each query to.
pub struct DnsHandler {
    block_engine: Arc<BlockEngine>,
    captive_portal: Arc<CaptivePortalDetector>,
    cache: Arc<DnsCache>,
    upstream: Arc<UpstreamPool>,
    rate_limiter: Arc<RateLimiter>,
    stats: Arc<StatsCollector>,
    config: HandlerConfig,
}

impl DnsHandler {
    pub fn new(
        block_engine: Arc<BlockEngine>,
        captive_portal: Arc<CaptivePortalDetector>,
        cache: Arc<DnsCache>,
        upstream: Arc<UpstreamPool>,
        rate_limiter: Arc<RateLimiter>,
        stats: Arc<StatsCollector>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            block_engine,
            captive_portal,
            cache,
            upstream,
            rate_limiter,
            stats,
            config,
        }
    }

    async fn answer(&self, domain: &str, qtype: QueryType, client_ip: std::net::IpAddr, request_header: &Header, request_message_bytes: &[u8]) -> Message {
        self.stats.record_query();

        if !self.rate_limiter.check(client_ip) {
            return refused(request_header);
        }

        // Step 2: record in the captive-portal detector regardless of outcome.
        self.captive_portal.record(domain);

        // Step 3: cache lookup.
        let cache_key = CacheKey::new(domain, qtype);
        if let Some(records) = self.cache.get(&cache_key) {
            self.stats.record_cache_hit();
            return synthesize_answer(request_header, domain, &records);
        }
        self.stats.record_cache_miss();

        // Step 4: block check. Bypassed entirely while captive-portal is
        // active, and a captive-portal probe domain is never sinkholed
        // even below the bypass threshold (§4.1, §8 scenario 4).
        if !self.captive_portal.is_active() && !self.captive_portal.is_exempt(domain) && self.block_engine.check(domain) == FilterDecision::Block {
            self.stats.record_blocked(domain, client_ip);
            return match qtype {
                QueryType::A => {
                    let records = vec![CachedRecord { addr: self.config.sinkhole_ipv4.into(), ttl: self.config.block_ttl }];
                    synthesize_answer(request_header, domain, &records)
                }
                QueryType::Aaaa => empty_noerror(request_header),
                QueryType::Other(_) => not_implemented(request_header),
            };
        }

        // Step 5: forward upstream, race all configured servers.
        match self.upstream.query(request_message_bytes).await {
            Ok(wire) => match Message::from_vec(&wire) {
                Ok(mut upstream_message) => {
                    if upstream_message.response_code() == ResponseCode::NoError && !upstream_message.answers().is_empty() {
                        let min_ttl = upstream_message.answers().iter().map(Record::ttl).min().unwrap_or(self.config.cache_max_ttl);
                        let ttl = min_ttl.min(self.config.cache_max_ttl);
                        let records: Vec<CachedRecord> = upstream_message
                            .answers()
                            .iter()
                            .filter_map(|r| match r.data() {
                                Some(RData::A(a)) => Some(CachedRecord { addr: std::net::IpAddr::V4(a.0), ttl }),
                                Some(RData::AAAA(a)) => Some(CachedRecord { addr: std::net::IpAddr::V6(a.0), ttl }),
                                _ => None,
                            })
                            .collect();
                        if !records.is_empty() {
                            self.cache.set(cache_key, records, ttl);
                        }
                    }
                    upstream_message.set_id(request_header.id());
                    upstream_message
                }
                Err(e) => {
                    warn!(error = %e, "failed to decode upstream response");
                    servfail(request_header)
                }
            },
            Err(e) => {
                warn!(error = %e, domain, "all upstreams failed");
                self.stats.record_upstream_error();
                servfail(request_header)
            }
        }
    }
}

#[async_trait]
impl RequestHandler for DnsHandler {
    async fn handle_request<R: ResponseHandler>(&self, request: &Request, mut response_handle: R) -> ResponseInfo {
        let builder = MessageResponseBuilder::from_message_request(request);

        if request.query_count() == 0 {
            let mut header = Header::response_from_request(request.header());
            header.set_message_type(MessageType::Response);
            let response = builder.build_no_records(header);
            return response_handle.send_response(response).await.unwrap_or_else(|_| ResponseInfo::from(*request.header()));
        }

        let query = request.query();
        let domain = normalize_domain(&query.name().to_string());
        let qtype = map_query_type(query.query_type());
        let client_ip = request.src().ip();
        let request_bytes = request.as_ref().to_vec().unwrap_or_default();

        let answer = self
            .answer(&domain, qtype, client_ip, request.header(), &request_bytes)
            .await;

        let header = *answer.header();
        let response = builder.build(
            header,
            answer.answers().iter(),
            answer.name_servers().iter(),
            &[],
            answer.additionals().iter(),
        );
        response_handle.send_response(response).await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to send DNS response");
            ResponseInfo::from(header)
        })
    }
}

/// Step 1: "trim trailing dot, lowercase."
fn normalize_domain(raw: &str) -> String {
    raw.trim_end_matches('.').to_ascii_lowercase()
}

fn map_query_type(qtype: hickory_proto::rr::RecordType) -> QueryType {
    match qtype {
        hickory_proto::rr::RecordType::A => QueryType::A,
        hickory_proto::rr::RecordType::AAAA => QueryType::Aaaa,
        other => QueryType::Other(u16::from(other)),
    }
}

fn base_response(request_header: &Header, code: ResponseCode) -> Message {
    let mut header = Header::response_from_request(request_header);
    header.set_message_type(MessageType::Response);
    header.set_op_code(OpCode::Query);
    header.set_response_code(code);
    let mut message = Message::new();
    *message.header_mut() = header;
    message
}

fn synthesize_answer(request_header: &Header, domain: &str, records: &[CachedRecord]) -> Message {
    let mut message = base_response(request_header, ResponseCode::NoError);
    let Ok(name) = Name::from_str(&format!("{domain}.")) else {
        return base_response(request_header, ResponseCode::FormErr);
    };
    for record in records {
        let rdata = match record.addr {
            std::net::IpAddr::V4(v4) => RData::A(A(v4)),
            std::net::IpAddr::V6(v6) => RData::AAAA(hickory_proto::rr::rdata::AAAA(v6)),
        };
        message.add_answer(Record::from_rdata(name.clone(), record.ttl, rdata));
    }
    message
}

fn empty_noerror(request_header: &Header) -> Message {
    base_response(request_header, ResponseCode::NoError)
}

fn not_implemented(request_header: &Header) -> Message {
    base_response(request_header, ResponseCode::NotImp)
}

fn servfail(request_header: &Header) -> Message {
    base_response(request_header, ResponseCode::ServFail)
}

fn refused(request_header: &Header) -> Message {
    base_response(request_header, ResponseCode::Refused)
}
