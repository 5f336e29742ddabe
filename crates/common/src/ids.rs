use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a booking aggregate.
    ///
    /// Wraps a UUID to provide type safety and prevent mixing up
    /// booking IDs with other UUID-based identifiers.
    BookingId
}

uuid_id! {
    /// Unique identifier for a payment attempt.
    PaymentId
}

uuid_id! {
    /// Unique identifier for a traveler account.
    UserId
}

uuid_id! {
    /// Unique identifier for a trip a booking may belong to.
    TripId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_id_new_creates_unique_ids() {
        let id1 = BookingId::new();
        let id2 = BookingId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn booking_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = BookingId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn id_serialization_roundtrip() {
        let id = PaymentId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: PaymentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn ids_of_different_kinds_serialize_as_plain_uuids() {
        let uuid = Uuid::new_v4();
        let user = UserId::from_uuid(uuid);
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
