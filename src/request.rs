//! # Data Requests
//!
//! The two lookups that leave the process: a directory entity by id and a
//! user's display name. Both go through the host-supplied [`DataRequest`]
//! collaborator and are the only suspending operations in the crate.
//!
//! Neither future supports cancellation or checks staleness. If the entity
//! the text was requested for changes before the future completes, the
//! caller discards the result.

use async_trait::async_trait;

use crate::format::{FormatLibrary, Messages};
use crate::model::Value;
use crate::Result;

/// Host-side request channel, addressed by domain and method.
#[async_trait]
pub trait DataRequest: Send + Sync {
    /// Perform `domain/method` with `args`. Transport failures surface as
    /// [`crate::Error::Request`].
    async fn request(&self, domain: &str, method: &str, args: Value) -> Result<Value>;
}

/// Pretty text for the directory entity `id`. `None` for an empty id.
pub async fn request_directory_entity_pretty<D: DataRequest + ?Sized>(
    requests: &D,
    id: &str,
    format: &FormatLibrary,
) -> Result<Option<String>> {
    if id.is_empty() {
        return Ok(None);
    }
    let entity = requests.request("directory", "getById", Value::from(id)).await?;
    Ok(Some(format.directory_entity(&entity)))
}

/// Display name of `user_id`, or the unknown-user message.
pub async fn request_user_display_name<D: DataRequest + ?Sized>(
    requests: &D,
    user_id: &str,
    messages: &Messages,
) -> Result<String> {
    let users = requests
        .request("user", "getUserNames", Value::List(vec![Value::from(user_id)]))
        .await?;
    let name = users
        .as_list()
        .and_then(|names| names.first())
        .map(Value::to_text)
        .filter(|name| !name.is_empty());
    Ok(name.unwrap_or_else(|| messages.get("user.unknown.displayName")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use parking_lot::Mutex;

    /// Replays canned responses and records what was asked.
    struct Canned {
        response: Result<Value>,
        calls: Mutex<Vec<(String, String, Value)>>,
    }

    impl Canned {
        fn new(response: Result<Value>) -> Self {
            Self { response, calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl DataRequest for Canned {
        async fn request(&self, domain: &str, method: &str, args: Value) -> Result<Value> {
            self.calls.lock().push((domain.to_string(), method.to_string(), args));
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(err) => Err(Error::Request(err.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_directory_entity() {
        let canned = Canned::new(Ok(Value::map([("displayName", "Jane Doe"), ("type", "person")])));
        let format = FormatLibrary::default();

        let pretty = request_directory_entity_pretty(&canned, "u1", &format).await.unwrap();
        assert_eq!(pretty.as_deref(), Some("Jane Doe (person)"));
        assert_eq!(request_directory_entity_pretty(&canned, "", &format).await.unwrap(), None);

        let calls = canned.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].0.as_str(), calls[0].1.as_str()), ("directory", "getById"));
    }

    #[tokio::test]
    async fn test_user_display_name() {
        let messages = Messages::default();
        let known = Canned::new(Ok(Value::List(vec![Value::from("Jane")])));
        assert_eq!(request_user_display_name(&known, "u1", &messages).await.unwrap(), "Jane");

        let empty = Canned::new(Ok(Value::List(vec![])));
        assert_eq!(request_user_display_name(&empty, "u1", &messages).await.unwrap(), "Unknown User");
    }

    #[tokio::test]
    async fn test_request_failure_propagates() {
        let failing = Canned::new(Err(Error::Request("offline".into())));
        let err = request_user_display_name(&failing, "u1", &Messages::default()).await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }
}
