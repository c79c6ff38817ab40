//! Save/load of designs against the remote design store.
//!
//! The gateway's public operations are action boundaries: every failure is
//! logged, shown to the user once through the [`Notifier`], and then either
//! returned (load, save, update, delete) or degraded (list yields nothing).
//! Saves always send the full node and edge collections.

use std::borrow::Cow;

use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::session::CurrentUser;

use super::alert::Notifier;
use super::clock::{Clock, rfc3339};
use super::error::{DesignerError, PayloadError, TransportError};
use super::types::{
	DesignId, DesignUpdate, Edge, GraphSnapshot, NewDesign, Node, SavedDesign, VIEW_MODE,
};

/// One call against the design store.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	pub method: Method,
	pub path: String,
	pub body: Option<Value>,
}

impl ApiRequest {
	fn new(method: Method, path: String) -> Self {
		Self {
			method,
			path,
			body: None,
		}
	}

	fn with_json(mut self, body: &impl Serialize) -> Result<Self, TransportError> {
		let body = serde_json::to_value(body).map_err(|e| TransportError::Encode(e.to_string()))?;
		self.body = Some(body);
		Ok(self)
	}
}

/// Sends requests to the design store. Bodies are JSON both ways.
#[async_trait(?Send)]
pub trait DesignTransport {
	/// Perform the request. An empty response body comes back as `Null`, a
	/// non-JSON one as a string.
	async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport rooted at the store's base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
	base_url: String,
	client: reqwest::Client,
}

impl HttpTransport {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			client: reqwest::Client::new(),
		}
	}
}

#[async_trait(?Send)]
impl DesignTransport for HttpTransport {
	async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
		let url = format!("{}{}", self.base_url, request.path);
		let mut builder = self.client.request(request.method, &url);
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}
		let response = builder
			.send()
			.await
			.map_err(|e| TransportError::Request(e.to_string()))?;
		let status = response.status();
		let text = response
			.text()
			.await
			.map_err(|e| TransportError::Request(e.to_string()))?;
		if !status.is_success() {
			return Err(TransportError::Status {
				status: status.as_u16(),
				body: text,
			});
		}
		Ok(parse_body(&text))
	}
}

fn parse_body(text: &str) -> Value {
	if text.trim().is_empty() {
		return Value::Null;
	}
	serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Decode a list field that may be an array or a JSON-encoded array string.
pub fn decode_array<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>, PayloadError> {
	let parsed;
	let items = match value {
		Value::Null => return Err(PayloadError::Missing),
		Value::Array(items) => items,
		Value::String(raw) => {
			parsed = serde_json::from_str::<Value>(raw)
				.map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
			match &parsed {
				Value::Array(items) => items,
				_ => return Err(PayloadError::NotAnArray),
			}
		}
		_ => return Err(PayloadError::NotAnArray),
	};
	items
		.iter()
		.map(|item| T::deserialize(item).map_err(|e| PayloadError::InvalidItem(e.to_string())))
		.collect()
}

/// Decode a list response, skipping records that are not designs.
pub fn decode_designs(value: &Value) -> Result<Vec<SavedDesign>, PayloadError> {
	let raw = decode_array::<Value>(value)?;
	Ok(raw
		.into_iter()
		.filter_map(|item| match serde_json::from_value::<SavedDesign>(item) {
			Ok(design) => Some(design),
			Err(e) => {
				warn!("skipping unreadable design summary: {e}");
				None
			}
		})
		.collect())
}

/// A fetched design with its graph decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDesign {
	pub design: SavedDesign,
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl LoadedDesign {
	/// Decode `elements`/`connections`, coercing either to empty when malformed.
	pub fn from_saved(design: SavedDesign) -> Self {
		let nodes = decode_array::<Node>(&design.elements).unwrap_or_else(|e| {
			warn!("design {}: elements coerced to empty: {e}", design.id);
			Vec::new()
		});
		let edges = decode_array::<Edge>(&design.connections).unwrap_or_else(|e| {
			warn!("design {}: connections coerced to empty: {e}", design.id);
			Vec::new()
		});
		Self {
			design,
			nodes,
			edges,
		}
	}
}

/// Percent-encode one path segment.
fn segment(raw: &str) -> Cow<'_, str> {
	urlencoding::encode(raw)
}

fn require_user(user: Option<&CurrentUser>) -> Result<&CurrentUser, DesignerError> {
	user.ok_or(DesignerError::NotLoggedIn)
}

/// Translates between the in-memory graph and the design store.
pub struct PersistenceGateway<T, N> {
	transport: T,
	notifier: N,
}

impl<T: DesignTransport, N: Notifier> PersistenceGateway<T, N> {
	pub fn new(transport: T, notifier: N) -> Self {
		Self {
			transport,
			notifier,
		}
	}

	#[cfg(test)]
	pub(crate) fn transport(&self) -> &T {
		&self.transport
	}

	pub fn notifier(&self) -> &N {
		&self.notifier
	}

	/// All designs for `user`. Failures alert and yield an empty list.
	pub async fn list(&self, user: Option<&CurrentUser>) -> Vec<SavedDesign> {
		match self.try_list(user).await {
			Ok(designs) => {
				info!("listed {} designs", designs.len());
				designs
			}
			Err(e) => {
				self.fail("list designs", &e);
				Vec::new()
			}
		}
	}

	async fn try_list(&self, user: Option<&CurrentUser>) -> Result<Vec<SavedDesign>, DesignerError> {
		let user = require_user(user)?;
		let body = self
			.transport
			.send(ApiRequest::new(
				Method::GET,
				format!("/list/{}", segment(&user.user_id)),
			))
			.await?;
		Ok(decode_designs(&body).unwrap_or_else(|e| {
			warn!("design list coerced to empty: {e}");
			Vec::new()
		}))
	}

	/// Fetch one design and decode its graph.
	pub async fn load(
		&self,
		user: Option<&CurrentUser>,
		id: DesignId,
	) -> Result<LoadedDesign, DesignerError> {
		let result = self.try_load(user, id).await;
		match &result {
			Ok(loaded) => info!(
				"loaded design {} ({} nodes, {} edges)",
				id,
				loaded.nodes.len(),
				loaded.edges.len()
			),
			Err(e) => self.fail("load design", e),
		}
		result
	}

	async fn try_load(
		&self,
		user: Option<&CurrentUser>,
		id: DesignId,
	) -> Result<LoadedDesign, DesignerError> {
		let user = require_user(user)?;
		let mut body = self
			.transport
			.send(ApiRequest::new(
				Method::GET,
				format!("/load/{}/{}", segment(&user.user_id), id),
			))
			.await?;
		if let Value::String(raw) = &body {
			body = serde_json::from_str(raw).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
		}
		if let Value::Object(map) = &mut body {
			map.entry("id").or_insert(Value::from(id.0));
		}
		let design = serde_json::from_value::<SavedDesign>(body)
			.map_err(|e| PayloadError::InvalidItem(e.to_string()))?;
		Ok(LoadedDesign::from_saved(design))
	}

	/// Save `graph` as a brand-new design and return its id.
	///
	/// The id is the current timestamp unless the store answers with its own.
	pub async fn create_new(
		&self,
		user: Option<&CurrentUser>,
		name: &str,
		graph: &GraphSnapshot,
		clock: &impl Clock,
	) -> Result<DesignId, DesignerError> {
		let result = self.try_create(user, name, graph, clock).await;
		match &result {
			Ok(id) => {
				info!("saved new design {id} with {} parts", graph.nodes.len());
				self.notifier.info("Design saved successfully!");
			}
			Err(e) => self.fail("save design", e),
		}
		result
	}

	async fn try_create(
		&self,
		user: Option<&CurrentUser>,
		name: &str,
		graph: &GraphSnapshot,
		clock: &impl Clock,
	) -> Result<DesignId, DesignerError> {
		let user = require_user(user)?;
		let name = name.trim();
		if name.is_empty() {
			return Err(DesignerError::EmptyDesignName);
		}
		let now = clock.now_ms();
		let payload = NewDesign {
			id: DesignId(now),
			user_id: &user.user_id,
			name,
			view_mode: VIEW_MODE,
			elements: &graph.nodes,
			connections: &graph.edges,
			parts_count: graph.nodes.len(),
			created_at: rfc3339(now),
		};
		let request = ApiRequest::new(Method::POST, "/save".into()).with_json(&payload)?;
		let response = self.transport.send(request).await?;
		let assigned = response
			.get("id")
			.and_then(|id| serde_json::from_value::<DesignId>(id.clone()).ok());
		Ok(assigned.unwrap_or(payload.id))
	}

	/// Overwrite the design `id` with `graph`.
	pub async fn update_existing(
		&self,
		user: Option<&CurrentUser>,
		id: Option<DesignId>,
		name: &str,
		graph: &GraphSnapshot,
	) -> Result<(), DesignerError> {
		let result = self.try_update(user, id, name, graph).await;
		match &result {
			Ok(()) => {
				info!("updated design with {} parts", graph.nodes.len());
				self.notifier.info("Design updated successfully!");
			}
			Err(e) => self.fail("update design", e),
		}
		result
	}

	async fn try_update(
		&self,
		user: Option<&CurrentUser>,
		id: Option<DesignId>,
		name: &str,
		graph: &GraphSnapshot,
	) -> Result<(), DesignerError> {
		let user = require_user(user)?;
		let id = id.ok_or(DesignerError::NoDesignSelected)?;
		let payload = DesignUpdate {
			name,
			view_mode: VIEW_MODE,
			elements: &graph.nodes,
			connections: &graph.edges,
			parts_count: graph.nodes.len(),
		};
		let path = format!("/update/{}/{}", segment(&user.user_id), id);
		let request = ApiRequest::new(Method::PUT, path).with_json(&payload)?;
		self.transport.send(request).await?;
		Ok(())
	}

	/// Remove a saved design.
	pub async fn delete(&self, user: Option<&CurrentUser>, id: DesignId) -> Result<(), DesignerError> {
		let result = self.try_delete(user, id).await;
		match &result {
			Ok(()) => {
				info!("deleted design {id}");
				self.notifier.info("Design deleted successfully!");
			}
			Err(e) => self.fail("delete design", e),
		}
		result
	}

	async fn try_delete(&self, user: Option<&CurrentUser>, id: DesignId) -> Result<(), DesignerError> {
		let user = require_user(user)?;
		self.transport
			.send(ApiRequest::new(
				Method::DELETE,
				format!("/delete/{}/{}", segment(&user.user_id), id),
			))
			.await?;
		Ok(())
	}

	fn fail(&self, action: &str, err: &DesignerError) {
		error!("{action} failed: {err}");
		self.notifier.alert(&err.to_string());
	}
}
