// Copyright 2025 Filterql Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Compiled pattern cache for LIKE and regex evaluation
//!
//! LIKE wildcards and the regex functions re-evaluate their pattern for
//! every row of a scan; compiling on each row would dominate evaluation
//! cost. Compiled patterns are cached process-wide, keyed by the final
//! regex source string.

use std::sync::{OnceLock, RwLock};

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::core::{Error, Result};

/// Maximum number of cached patterns before wholesale eviction
const MAX_CACHE_SIZE: usize = 1_000;

fn cache() -> &'static RwLock<FxHashMap<String, Regex>> {
    static CACHE: OnceLock<RwLock<FxHashMap<String, Regex>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Get a compiled regex for the pattern, compiling and caching on miss
pub(crate) fn get_or_compile(pattern: &str) -> Result<Regex> {
    if let Some(re) = cache().read().expect("pattern cache poisoned").get(pattern) {
        return Ok(re.clone());
    }

    let re = Regex::new(pattern).map_err(|e| {
        Error::evaluation(format!("invalid regular expression '{}': {}", pattern, e))
    })?;

    let mut cache = cache().write().expect("pattern cache poisoned");
    if cache.len() >= MAX_CACHE_SIZE {
        cache.clear();
    }
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

/// Translate a SQL LIKE pattern to an anchored, case-insensitive regex.
///
/// `%` matches any run of characters, `_` matches exactly one; all other
/// characters match literally.
pub(crate) fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 6);
    regex.push_str("(?i)^");

    for ch in pattern.chars() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            c => {
                let escaped = regex::escape(&c.to_string());
                regex.push_str(&escaped);
            }
        }
    }

    regex.push('$');
    regex
}
