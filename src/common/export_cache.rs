// src/common/export_cache.rs

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// Fonte de tempo injetável: os testes de TTL avançam o relógio em vez de
/// dormir.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// TTL padrão das exportações renderizadas (5 minutos, como na origem).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    payload: String,
    stored_at: Instant,
}

/// Cache de exportações renderizadas, chaveado por hash de conteúdo.
/// É um componente possuído (vive dentro do serviço de exportação),
/// não um estado global de módulo.
pub struct ExportCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl ExportCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Chave de conteúdo: sha256 hex do material de origem serializado.
    /// Mesmos dados filtrados ⇒ mesma chave, independente do chamador.
    pub fn content_key(material: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(material.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Entrada vencida é removida na própria leitura.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) <= self.ttl => {
                Some(entry.payload.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, payload: String) {
        let stored_at = self.clock.now();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, CacheEntry { payload, stored_at });
    }

    /// Esvazia o cache e devolve quantas entradas existiam.
    pub fn clear(&self) -> usize {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let removed = entries.len();
        entries.clear();
        removed
    }
}
