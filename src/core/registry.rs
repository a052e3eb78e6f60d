//! # Service Registry
//!
//! Singleton dependency injection for the `#[service]` and `#[repository]`
//! macros from `singleton_macro`.
//!
//! ## How it fits together
//!
//! ```text
//! compile time
//!   #[repository(name = "book", collection = "books")] → RepositoryRegistration
//!   #[service(name = "book")]                          → ServiceRegistration
//!   inventory::collect!                                → global registry
//!
//! startup (main.rs)
//!   ServiceLocator::set(Arc<Database>)                 → infrastructure
//!   ServiceLocator::set(Arc<RedisClient>)
//!   ServiceLocator::initialize_all()                   → repositories, then services
//!
//! runtime
//!   BookService::instance()                            → cached Arc<BookService>
//! ```
//!
//! Fields typed `Arc<T>` inside a macro-annotated struct are resolved through
//! [`ServiceLocator::get`]. The requested type name is mapped back to its
//! registration: `BookRepository` → `book`, `IdentityService` → `identity`.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[repository(name = "book", collection = "books")]
//! pub struct BookRepository {
//!     db: Arc<Database>,
//!     redis: Arc<RedisClient>,
//! }
//!
//! #[service(name = "book")]
//! pub struct BookService {
//!     book_repo: Arc<BookRepository>,
//! }
//!
//! let service = BookService::instance();
//! ```

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;

/// Common interface implemented by every `#[service]` struct
#[async_trait]
pub trait Service: Send + Sync {
    /// Registered name, `<name>_service`
    fn name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// Common interface implemented by every `#[repository]` struct
#[async_trait]
pub trait Repository: Send + Sync {
    /// Registered name, `<name>_repository`
    fn name(&self) -> &str;

    /// MongoDB collection backing this repository
    fn collection_name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// Registration emitted by `#[service]`
pub struct ServiceRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

/// Registration emitted by `#[repository]`
pub struct RepositoryRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(ServiceRegistration);
inventory::collect!(RepositoryRegistration);

/// Shared view over both registration kinds
trait Registration: Sync + 'static {
    fn registered_name(&self) -> &'static str;
    fn construct(&self) -> Box<dyn Any + Send + Sync>;
}

impl Registration for ServiceRegistration {
    fn registered_name(&self) -> &'static str {
        self.name
    }

    fn construct(&self) -> Box<dyn Any + Send + Sync> {
        (self.constructor)()
    }
}

impl Registration for RepositoryRegistration {
    fn registered_name(&self) -> &'static str {
        self.name
    }

    fn construct(&self) -> Box<dyn Any + Send + Sync> {
        (self.constructor)()
    }
}

/// Component category derived from a type or registration name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentKind {
    Service,
    Repository,
}

impl ComponentKind {
    fn type_suffix(self) -> &'static str {
        match self {
            ComponentKind::Service => "Service",
            ComponentKind::Repository => "Repository",
        }
    }

    fn registration_suffix(self) -> &'static str {
        match self {
            ComponentKind::Service => "_service",
            ComponentKind::Repository => "_repository",
        }
    }
}

fn build_name_index<R: Registration>(
    registrations: impl IntoIterator<Item = &'static R>,
    kind: ComponentKind,
) -> HashMap<String, &'static R> {
    let index: HashMap<String, &'static R> = registrations
        .into_iter()
        .map(|registration| {
            let name = registration.registered_name();
            let key = name
                .strip_suffix(kind.registration_suffix())
                .unwrap_or(name)
                .to_string();
            (key, registration)
        })
        .collect();

    debug!("{:?} registry indexed: {} entries", kind, index.len());
    index
}

static SERVICE_INDEX: Lazy<HashMap<String, &'static ServiceRegistration>> =
    Lazy::new(|| build_name_index(inventory::iter::<ServiceRegistration>(), ComponentKind::Service));

static REPOSITORY_INDEX: Lazy<HashMap<String, &'static RepositoryRegistration>> = Lazy::new(|| {
    build_name_index(inventory::iter::<RepositoryRegistration>(), ComponentKind::Repository)
});

/// `catalog_service_backend::services::books::book_service::BookService` → `BookService`
fn short_type_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

/// `BookRepository` → `(Repository, "book")`
fn classify(short_name: &str) -> Option<(ComponentKind, String)> {
    [ComponentKind::Repository, ComponentKind::Service]
        .into_iter()
        .find_map(|kind| {
            short_name
                .strip_suffix(kind.type_suffix())
                .map(|entity| (kind, entity.to_lowercase()))
        })
}

/// Global singleton container
///
/// Instances are keyed by `TypeId`. A type is constructed at most once; the
/// `initializing` set turns a dependency cycle into an immediate panic
/// instead of a deadlock.
pub struct ServiceLocator {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    initializing: RwLock<HashSet<TypeId>>,
}

static LOCATOR: Lazy<ServiceLocator> = Lazy::new(|| ServiceLocator {
    instances: RwLock::new(HashMap::new()),
    initializing: RwLock::new(HashSet::new()),
});

impl ServiceLocator {
    /// Returns the singleton for `T`, constructing it on first use.
    ///
    /// # Panics
    ///
    /// Dependency resolution happens inside generated constructors, which
    /// cannot return errors. These situations panic at startup:
    ///
    /// - a dependency cycle (`A` needs `B` needs `A`)
    /// - a type that is neither registered by macro nor `set` manually
    /// - a registration whose constructor yields a different type
    pub fn get<T: 'static + Send + Sync>() -> Arc<T> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(instance) = Self::cached::<T>(type_id) {
            return instance;
        }

        {
            let mut initializing = LOCATOR
                .initializing
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if !initializing.insert(type_id) {
                panic!("Circular dependency detected: {} is already being initialized", type_name);
            }
        }

        // Constructors resolve their own dependencies through `get`, so no
        // lock may be held while they run.
        let constructed = Self::construct::<T>(type_name);

        LOCATOR
            .initializing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&type_id);

        let mut instances = LOCATOR
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = instances
            .entry(type_id)
            .or_insert_with(|| constructed as Arc<dyn Any + Send + Sync>)
            .clone();

        match entry.downcast::<T>() {
            Ok(instance) => instance,
            Err(_) => panic!("Type mismatch in ServiceLocator for {}", type_name),
        }
    }

    fn cached<T: 'static + Send + Sync>(type_id: TypeId) -> Option<Arc<T>> {
        let instances = LOCATOR
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        instances
            .get(&type_id)
            .and_then(|instance| instance.clone().downcast::<T>().ok())
    }

    fn construct<T: 'static + Send + Sync>(type_name: &str) -> Arc<T> {
        let short_name = short_type_name(type_name);
        let (kind, entity) = classify(short_name).unwrap_or_else(|| {
            panic!(
                "{} is not a registered component. Annotate it with #[service] or #[repository], or register it with ServiceLocator::set()",
                type_name
            )
        });

        let boxed = match kind {
            ComponentKind::Repository => REPOSITORY_INDEX.get(&entity).map(|r| r.construct()),
            ComponentKind::Service => SERVICE_INDEX.get(&entity).map(|r| r.construct()),
        }
        .unwrap_or_else(|| panic!("No {:?} registered under '{}' for {}", kind, entity, type_name));

        match boxed.downcast::<Arc<T>>() {
            Ok(instance) => *instance,
            Err(_) => panic!("Type mismatch for {:?} '{}'", kind, entity),
        }
    }

    /// Registers an externally built instance (database handle, cache client).
    ///
    /// ```rust,ignore
    /// ServiceLocator::set(Arc::new(Database::new().await?));
    /// ServiceLocator::set(Arc::new(RedisClient::new().await?));
    /// ```
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        info!("📦 Registering: {}", short_type_name(std::any::type_name::<T>()));

        LOCATOR
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>);
    }

    /// Eagerly constructs every registered repository, then every service.
    ///
    /// Infrastructure must already be registered with [`ServiceLocator::set`].
    pub async fn initialize_all() -> Result<(), Box<dyn std::error::Error>> {
        info!("🔄 Initializing service registry");

        let repositories: Vec<_> = inventory::iter::<RepositoryRegistration>().collect();
        for registration in &repositories {
            let _ = registration.construct();
            debug!("  ✓ {}", registration.name);
        }
        info!("  repositories ready: {}", repositories.len());

        let services: Vec<_> = inventory::iter::<ServiceRegistration>().collect();
        for registration in &services {
            let _ = registration.construct();
            debug!("  ✓ {}", registration.name);
        }
        info!("  services ready: {}", services.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClockHandle {
        label: &'static str,
    }

    #[test]
    fn test_short_type_name_strips_module_path() {
        assert_eq!(
            short_type_name("catalog_service_backend::services::books::book_service::BookService"),
            "BookService"
        );
        assert_eq!(short_type_name("Database"), "Database");
    }

    #[test]
    fn test_classify_maps_type_to_registration_key() {
        assert_eq!(
            classify("BookRepository"),
            Some((ComponentKind::Repository, "book".to_string()))
        );
        assert_eq!(
            classify("IdentityService"),
            Some((ComponentKind::Service, "identity".to_string()))
        );
        assert_eq!(classify("RedisClient"), None);
    }

    #[test]
    fn test_set_then_get_returns_same_instance() {
        let handle = Arc::new(ClockHandle { label: "manual" });
        ServiceLocator::set(handle.clone());

        let resolved = ServiceLocator::get::<ClockHandle>();

        assert!(Arc::ptr_eq(&handle, &resolved));
        assert_eq!(resolved.label, "manual");
    }
}
