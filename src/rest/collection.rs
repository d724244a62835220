//! Listing endpoints and lazy pagination.
//!
//! A [`Collection`] is bound to one listing URL and one item type. It can:
//!
//! - enumerate the listing lazily with [`Collection::all`], following the
//!   `next` link of each page
//! - look up one item with [`Collection::get`]
//! - create an item with [`Collection::create`]
//! - synthesize items from an inline payload with [`Collection::from_seed`]
//!
//! What a given collection may do comes from its [`CollectionSpec`].
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::rest::{ListParams, Lookup};
//!
//! let accounts = identity.accounts().unwrap();
//!
//! // Nothing is requested until the first item is pulled.
//! let mut pager = accounts.all(ListParams {
//!     include_expired_accounts: true,
//!     role: Some("owner".to_string()),
//!     ..ListParams::default()
//! });
//! while let Some(account) = pager.try_next().await? {
//!     println!("{:?}", account.name());
//! }
//!
//! let one = accounts.get(Lookup::uuid("a4c9bce4-2a8c-452f-ae13-0a0b69dfd4ba")).await?;
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::Stream;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::HttpClient;
use crate::rest::kinds::{build_path, origin_of, IDENTITIES_PATH, IDENTITY_PATH};
use crate::rest::{
    CollectionSpec, FromPayload, LoadOptions, LookupStyle, ResourceError, ResourceOperation,
};

/// Filters for [`Collection::all`].
///
/// `None` and `false` values are left out of the query; `true` is sent as
/// the literal `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// Only items matching this email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Only the item with this uuid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Include expired accounts.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_expired_accounts: bool,
    /// Include accounts of other applications.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_other_services: bool,
    /// Only accounts where the identity has this role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Server-side ordering (e.g. `newest-first`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

impl ListParams {
    /// Returns the query parameters these filters translate into.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArguments`] if the filters cannot be
    /// serialized.
    pub fn to_query(&self) -> Result<HashMap<String, String>, ResourceError> {
        serialize_to_query(self)
    }
}

/// The key of a single-item lookup.
///
/// When both keys are set, `uuid` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    /// Look the item up by identifier.
    pub uuid: Option<String>,
    /// Look the item up by email.
    pub email: Option<String>,
}

impl Lookup {
    /// A lookup by identifier.
    #[must_use]
    pub fn uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            email: None,
        }
    }

    /// A lookup by email.
    #[must_use]
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            uuid: None,
            email: Some(email.into()),
        }
    }

    /// Builds a lookup from keyword pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArguments`] for any key other than
    /// `uuid` or `email`.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, ResourceError> {
        let mut lookup = Self::default();
        for (key, value) in pairs {
            match *key {
                "uuid" => lookup.uuid = Some((*value).to_string()),
                "email" => lookup.email = Some((*value).to_string()),
                other => {
                    return Err(ResourceError::InvalidArguments {
                        resource: "Collection",
                        operation: ResourceOperation::Get.as_str(),
                        reason: format!("unrecognized lookup key '{other}'"),
                    })
                }
            }
        }
        Ok(lookup)
    }
}

/// A listing endpoint bound to one item type.
///
/// Collections are cheap to clone: the client is shared.
pub struct Collection<T> {
    url: String,
    client: Arc<HttpClient>,
    spec: CollectionSpec,
    seed: Vec<Map<String, Value>>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            client: Arc::clone(&self.client),
            spec: self.spec,
            seed: self.seed.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.spec.name)
            .field("url", &self.url)
            .field("seed", &self.seed.len())
            .finish_non_exhaustive()
    }
}

impl<T> Collection<T> {
    /// Creates a collection at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, client: Arc<HttpClient>, spec: CollectionSpec) -> Self {
        Self {
            url: url.into(),
            client,
            spec,
            seed: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Attaches an inline payload to synthesize items from.
    #[must_use]
    pub fn with_seed(mut self, seed: Vec<Map<String, Value>>) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the listing URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns what this collection may do.
    #[must_use]
    pub const fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    /// Returns the client this collection talks through.
    #[must_use]
    pub const fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Returns the inline payload items are synthesized from.
    #[must_use]
    pub fn seed(&self) -> &[Map<String, Value>] {
        &self.seed
    }

    /// Returns `true` if `create` may be used.
    #[must_use]
    pub const fn can_create(&self) -> bool {
        self.spec.can_create
    }

    /// Returns `true` if `all` may be used.
    #[must_use]
    pub const fn can_list(&self) -> bool {
        self.spec.can_list
    }

    /// Returns this collection bound to another client.
    #[must_use]
    pub fn rebind(self, client: Arc<HttpClient>) -> Self {
        Self { client, ..self }
    }

    fn origin(&self) -> String {
        origin_of(&self.url)
    }

    fn usage_error(&self, operation: ResourceOperation, reason: impl Into<String>) -> ResourceError {
        ResourceError::InvalidArguments {
            resource: self.spec.name,
            operation: operation.as_str(),
            reason: reason.into(),
        }
    }
}

impl<T: FromPayload> Collection<T> {
    /// Synthesizes items from the inline payload, without requests.
    pub fn from_seed(&self) -> impl Iterator<Item = T> + '_ {
        self.seed
            .iter()
            .map(|data| T::from_payload(data.clone(), Arc::clone(&self.client), None))
    }

    /// Enumerates the listing lazily.
    ///
    /// Nothing is requested until the returned pager is first pulled. Each
    /// call starts over from the first page.
    #[must_use]
    pub fn all(&self, params: ListParams) -> Pager<T> {
        let cursor = if self.spec.can_list {
            match params.to_query() {
                Ok(query) => Cursor::Start {
                    url: self.url.clone(),
                    query,
                },
                Err(e) => Cursor::Failed(e),
            }
        } else {
            Cursor::Forbidden
        };

        Pager {
            name: self.spec.name,
            client: Arc::clone(&self.client),
            cursor,
            buffer: VecDeque::new(),
            pages: 0,
            _item: PhantomData,
        }
    }

    /// Looks up a single item by uuid or email and probes its metadata.
    ///
    /// Collections using the identities lookup address the item under
    /// `/accounts/api/identities/`; others under their own URL. The
    /// collection itself is never modified.
    ///
    /// The item is probed at its own URL, so it can be saved right away.
    /// Items that know no URL of their own (stubs, email matches without a
    /// `url` key) come back unprobed.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::InvalidArguments`] if neither key is given
    /// - [`ResourceError::UnexpectedBody`] if an email lookup matched nothing
    /// - [`ResourceError::Http`] if the platform rejects the lookup or the probe
    pub async fn get(&self, lookup: Lookup) -> Result<T, ResourceError> {
        self.get_with(lookup, LoadOptions::default()).await
    }

    /// Looks up a single item, probing its metadata only if `options` say so.
    ///
    /// # Errors
    ///
    /// See [`Collection::get`].
    pub async fn get_with(&self, lookup: Lookup, options: LoadOptions) -> Result<T, ResourceError> {
        let by_uuid = lookup.uuid.is_some();
        let (url, query) = match (lookup.uuid, lookup.email) {
            (Some(uuid), _) => {
                let url = match self.spec.lookup {
                    LookupStyle::Identities => {
                        format!("{}{}", self.origin(), build_path(IDENTITY_PATH, &[("uuid", &uuid)]))
                    }
                    LookupStyle::Nested => {
                        format!("{}{}/", self.url, urlencoding::encode(&uuid))
                    }
                };
                (url, None)
            }
            (None, Some(email)) => {
                let url = match self.spec.lookup {
                    LookupStyle::Identities => format!("{}{IDENTITIES_PATH}", self.origin()),
                    LookupStyle::Nested => self.url.clone(),
                };
                (url, Some(HashMap::from([("email".to_string(), email)])))
            }
            (None, None) => {
                return Err(self.usage_error(ResourceOperation::Get, "uuid or email is required"));
            }
        };

        let response = self.client.get(&url, query).await?;

        let (data, response_url) = match response.body {
            Value::Object(mut map) if map.get("results").is_some_and(Value::is_array) => {
                let items = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                (first_object(self.spec.name, items)?, None)
            }
            // Only a uuid lookup is addressed to the item itself
            Value::Object(map) => (map, by_uuid.then_some(response.url)),
            Value::Array(items) => (first_object(self.spec.name, items)?, None),
            other => {
                return Err(ResourceError::UnexpectedBody {
                    resource: self.spec.name,
                    reason: format!("expected an object or a list, got {other}"),
                })
            }
        };

        let mut item = T::from_payload(data, Arc::clone(&self.client), response_url);
        if options.probe {
            if let Some(resource) = item
                .backing_resource_mut()
                .filter(|resource| resource.url().is_some())
            {
                resource.load_options().await?;
            }
        }

        Ok(item)
    }

    /// Creates an item and returns what the platform built.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::OperationNotAllowed`] if the collection forbids creation
    /// - [`ResourceError::UnexpectedBody`] if the answer is not an object
    /// - [`ResourceError::Http`] if the platform rejects the creation
    pub async fn create(&self, attrs: Map<String, Value>) -> Result<T, ResourceError> {
        if !self.spec.can_create {
            return Err(ResourceError::OperationNotAllowed {
                resource: self.spec.name,
                operation: ResourceOperation::Create.as_str(),
            });
        }

        let response = self.client.post(&self.url, Value::Object(attrs)).await?;
        let response_url = response
            .header("location")
            .map_or_else(|| response.url.clone(), ToString::to_string);

        match response.body {
            Value::Object(data) => Ok(T::from_payload(
                data,
                Arc::clone(&self.client),
                Some(response_url),
            )),
            other => Err(ResourceError::UnexpectedBody {
                resource: self.spec.name,
                reason: format!("expected an object, got {other}"),
            }),
        }
    }
}

fn first_object(name: &'static str, items: Vec<Value>) -> Result<Map<String, Value>, ResourceError> {
    match items.into_iter().next() {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ResourceError::UnexpectedBody {
            resource: name,
            reason: format!("expected an object item, got {other}"),
        }),
        None => Err(ResourceError::UnexpectedBody {
            resource: name,
            reason: "lookup matched no item".to_string(),
        }),
    }
}

enum Cursor {
    Start {
        url: String,
        query: HashMap<String, String>,
    },
    Next(String),
    Forbidden,
    Failed(ResourceError),
    Done,
}

/// A forward-only, lazily fetched sequence of collection items.
///
/// One request is made per page, only when the items already fetched have
/// been consumed. After an error the pager is exhausted.
pub struct Pager<T> {
    name: &'static str,
    client: Arc<HttpClient>,
    cursor: Cursor,
    buffer: VecDeque<T>,
    pages: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("name", &self.name)
            .field("pages", &self.pages)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl<T: FromPayload> Pager<T> {
    /// Returns the next item, fetching the next page when needed.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::OperationNotAllowed`] if the collection cannot be listed
    /// - [`ResourceError::UnexpectedBody`] if a page has the wrong shape
    /// - [`ResourceError::Http`] if a page request fails
    pub async fn try_next(&mut self) -> Result<Option<T>, ResourceError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let (url, query) = match std::mem::replace(&mut self.cursor, Cursor::Done) {
                Cursor::Done => return Ok(None),
                Cursor::Forbidden => {
                    return Err(ResourceError::OperationNotAllowed {
                        resource: self.name,
                        operation: ResourceOperation::All.as_str(),
                    })
                }
                Cursor::Failed(e) => return Err(e),
                Cursor::Start { url, query } => (url, Some(query).filter(|q| !q.is_empty())),
                Cursor::Next(url) => (url, None),
            };

            self.fetch_page(&url, query).await?;
        }
    }

    /// Drains the pager into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first error any page produced.
    pub async fn collect_all(mut self) -> Result<Vec<T>, ResourceError> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Turns the pager into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<T, ResourceError>> {
        futures::stream::try_unfold(self, |mut pager| async move {
            let item = pager.try_next().await?;
            Ok::<_, ResourceError>(item.map(|item| (item, pager)))
        })
    }

    /// Returns how many pages have been fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages
    }

    async fn fetch_page(
        &mut self,
        url: &str,
        query: Option<HashMap<String, String>>,
    ) -> Result<(), ResourceError> {
        let response = self.client.get(url, query).await?;
        self.pages += 1;

        let (items, next) = match response.body {
            Value::Array(items) => (items, None),
            Value::Object(mut page) => {
                let items = match page.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => {
                        return Err(ResourceError::UnexpectedBody {
                            resource: self.name,
                            reason: "page has no 'results' list".to_string(),
                        })
                    }
                };
                let next = page
                    .get("next")
                    .and_then(Value::as_str)
                    .filter(|next| !next.is_empty())
                    .map(ToString::to_string);
                (items, next)
            }
            other => {
                return Err(ResourceError::UnexpectedBody {
                    resource: self.name,
                    reason: format!("expected a list or a page, got {other}"),
                })
            }
        };

        tracing::debug!(
            collection = self.name,
            page = self.pages,
            items = items.len(),
            has_next = next.is_some(),
            "Fetched collection page"
        );

        for item in items {
            match item {
                Value::Object(data) => self.buffer.push_back(T::from_payload(
                    data,
                    Arc::clone(&self.client),
                    None,
                )),
                other => {
                    return Err(ResourceError::UnexpectedBody {
                        resource: self.name,
                        reason: format!("expected an object item, got {other}"),
                    })
                }
            }
        }

        if let Some(next) = next {
            self.cursor = Cursor::Next(next);
        }

        Ok(())
    }
}

/// Serializes a params struct to a query parameter map.
fn serialize_to_query<T: Serialize>(params: &T) -> Result<HashMap<String, String>, ResourceError> {
    let value = serde_json::to_value(params).map_err(|e| ResourceError::InvalidArguments {
        resource: "Collection",
        operation: ResourceOperation::All.as_str(),
        reason: format!("Failed to serialize params: {e}"),
    })?;

    let mut query = HashMap::new();

    if let Value::Object(map) = value {
        for (key, val) in map {
            match val {
                Value::Null => {}
                Value::String(s) => {
                    query.insert(key, s);
                }
                Value::Number(n) => {
                    query.insert(key, n.to_string());
                }
                Value::Bool(b) => {
                    query.insert(key, b.to_string());
                }
                Value::Array(_) | Value::Object(_) => {
                    query.insert(key, val.to_string());
                }
            }
        }
    }

    Ok(query)
}
