//! NVS (Non-Volatile Storage) adapter.
//!
//! Persists [`TankConfig`] as a postcard blob under the `tanksentry`
//! namespace. Configs are range-checked on the way in AND on the way out,
//! so a blob written by an older firmware with looser limits cannot put
//! the controller into an invalid state. ESP-IDF NVS commits are atomic
//! per `nvs_commit()`; the simulation backend is an in-memory map.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::config::TankConfig;
use crate::error::ConfigError;
use crate::ports::ConfigPort;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "tanksentry";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"tankcfg\0";

#[allow(dead_code)]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsStore {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsStore {
    /// Create the store and initialise NVS flash.
    ///
    /// On first boot or after an IDF version bump the partition is erased
    /// and re-initialised automatically. Returns `Err(ConfigError::IoError)`
    /// only if flash init fails unrecoverably.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
            // main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NvsStore: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Open the config namespace, run a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CONFIG_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    fn decode(bytes: &[u8]) -> Result<TankConfig, ConfigError> {
        let cfg: TankConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl ConfigPort for NvsStore {
    fn load(&self) -> Result<TankConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if let Some(bytes) = self.store.borrow().get(CONFIG_NAMESPACE) {
                let cfg = Self::decode(bytes)?;
                info!("NvsStore: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsStore: no stored config, using defaults");
                Ok(TankConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let mut size: usize = 0;

                // First call sizes the blob.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    return Err(ESP_ERR_NVS_NOT_FOUND);
                }
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg = Self::decode(&bytes)?;
                    info!("NvsStore: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsStore: no stored config, using defaults");
                    Ok(TankConfig::default())
                }
                Err(e) => {
                    warn!("NvsStore: NVS read error {}, using defaults", e);
                    Ok(TankConfig::default())
                }
            }
        }
    }

    fn save(&self, config: &TankConfig) -> Result<(), ConfigError> {
        config.validate()?;

        #[cfg(not(target_os = "espidf"))]
        {
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            self.store
                .borrow_mut()
                .insert(CONFIG_NAMESPACE.to_string(), bytes);
            info!("NvsStore: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsStore: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsStore: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn load_without_stored_blob_yields_defaults() {
        let nvs = NvsStore::new().unwrap();
        assert_eq!(nvs.load().unwrap(), TankConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let nvs = NvsStore::new().unwrap();
        let cfg = TankConfig {
            debounce_window: 16,
            debounce_threshold: 9,
            ..TankConfig::default()
        };
        nvs.save(&cfg).unwrap();
        assert_eq!(nvs.load().unwrap(), cfg);
    }

    #[test]
    fn save_rejects_invalid_config() {
        let nvs = NvsStore::new().unwrap();
        let cfg = TankConfig {
            debounce_window: 0,
            ..TankConfig::default()
        };
        assert!(matches!(
            nvs.save(&cfg),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn corrupted_blob_is_reported() {
        let nvs = NvsStore::new().unwrap();
        nvs.store
            .borrow_mut()
            .insert(CONFIG_NAMESPACE.to_string(), vec![0xFF; 3]);
        assert!(matches!(nvs.load(), Err(ConfigError::Corrupted)));
    }
}
