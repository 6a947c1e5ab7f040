//! Security utilities for input validation and sanitization.
//!
//! This module provides:
//! - Video URL validation with a domain whitelist (SSRF protection)
//! - Media identifier validation (handles become filesystem paths)
//! - Input sanitization utilities

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Maximum URL length to prevent DoS attacks.
const MAX_URL_LENGTH: usize = 2048;

/// Maximum title length.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Maximum channel label length.
pub const MAX_CHANNEL_LENGTH: usize = 200;

/// Maximum media identifier length.
pub const MAX_MEDIA_ID_LENGTH: usize = 64;

/// Allowed video URL domains (whitelist for SSRF protection).
static ALLOWED_DOMAINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        // TikTok
        "tiktok.com",
        "www.tiktok.com",
        "vm.tiktok.com",
        // YouTube
        "youtube.com",
        "www.youtube.com",
        "youtu.be",
        "m.youtube.com",
        // Facebook
        "facebook.com",
        "www.facebook.com",
        "fb.watch",
        // Instagram
        "instagram.com",
        "www.instagram.com",
        // Twitter/X
        "twitter.com",
        "www.twitter.com",
        "x.com",
        "www.x.com",
        // Dailymotion
        "dailymotion.com",
        "www.dailymotion.com",
    ])
});

/// Blocked URL patterns (internal IPs, cloud metadata endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^https?://127\.").unwrap(),
        Regex::new(r"^https?://localhost").unwrap(),
        Regex::new(r"^https?://10\.").unwrap(),
        Regex::new(r"^https?://172\.(1[6-9]|2[0-9]|3[0-1])\.").unwrap(),
        Regex::new(r"^https?://192\.168\.").unwrap(),
        Regex::new(r"^https?://169\.254\.").unwrap(),
        Regex::new(r"^https?://\[::1\]").unwrap(),
        Regex::new(r"^https?://\[fd").unwrap(),
        Regex::new(r"^https?://\[fe80").unwrap(),
        Regex::new(r"^https?://metadata\.").unwrap(),
    ]
});

static MEDIA_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Validate a video URL for protocol, length, domain whitelist and
/// blocked patterns. Returns the trimmed URL on success.
pub fn validate_video_url(url: &str) -> Result<String, String> {
    if url.len() > MAX_URL_LENGTH {
        return Err(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        ));
    }

    let url = url.trim();
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("Unsupported URL scheme '{}'", other)),
    }

    for pattern in BLOCKED_PATTERNS.iter() {
        if pattern.is_match(url) {
            return Err("URL points to a blocked address".to_string());
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| "URL has no host".to_string())?;
    if !ALLOWED_DOMAINS.contains(host) {
        return Err(format!(
            "Domain '{}' is not allowed. Please use a supported video platform",
            host
        ));
    }

    Ok(url.to_string())
}

/// Validate a media identifier: it becomes part of the job handle and of
/// scratch paths, so it must be filesystem-safe.
pub fn validate_media_id(id: &str) -> Result<String, String> {
    let id = id.trim();
    if id.is_empty() {
        return Err("Media identifier cannot be empty".to_string());
    }
    if id.len() > MAX_MEDIA_ID_LENGTH {
        return Err(format!(
            "Media identifier exceeds maximum length of {} characters",
            MAX_MEDIA_ID_LENGTH
        ));
    }
    if !MEDIA_ID_PATTERN.is_match(id) {
        return Err(
            "Media identifier may only contain letters, digits, '-' and '_'".to_string(),
        );
    }
    Ok(id.to_string())
}

/// Strip control characters and clamp length.
pub fn sanitize_string(input: &str, max_len: usize) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect();
    let trimmed = cleaned.trim();
    trimmed.chars().take(max_len).collect()
}
