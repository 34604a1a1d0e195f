//! one stored version of an iou obligation.
//!
//! a record is immutable once built. a new version of the same obligation is a
//! new record carrying the same [`LinearId`]; nothing is ever edited in place.
//!
//! the record performs no validation. whoever builds it (the obligation layer,
//! or the cli on its behalf) is responsible for a non-negative value and
//! non-empty party names.

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::{
    ColumnType, ColumnValue, EntityDescriptor, Error, LinearId, PublicKey, Result,
    SchemaVersion, SignedMessage,
};

/// persisted form of an iou obligation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IouRecord {
    lender: Option<String>,
    borrower: Option<String>,
    value: i32,
    linear_id: Option<LinearId>,
    public_key: Option<PublicKey>,
    signed_message: Option<SignedMessage>,
}

impl IouRecord {
    /// build a fully populated record.
    pub fn new(
        lender: impl Into<String>,
        borrower: impl Into<String>,
        value: i32,
        linear_id: LinearId,
        public_key: Option<PublicKey>,
        signed_message: Option<SignedMessage>,
    ) -> Self {
        Self {
            lender: Some(lender.into()),
            borrower: Some(borrower.into()),
            value,
            linear_id: Some(linear_id),
            public_key,
            signed_message,
        }
    }

    /// the all-null record.
    ///
    /// never represents a real obligation; rows are materialized with
    /// [`IouRecord::from_row`] instead.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// whether every field is at its null/zero default.
    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }

    /// creditor party.
    pub fn lender(&self) -> Option<&str> {
        self.lender.as_deref()
    }

    /// debtor party.
    pub fn borrower(&self) -> Option<&str> {
        self.borrower.as_deref()
    }

    /// amount owed.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// id shared by all versions of this obligation.
    pub fn linear_id(&self) -> Option<LinearId> {
        self.linear_id
    }

    /// public key attached by the obligation layer.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// detached signature attached by the obligation layer.
    pub fn signed_message(&self) -> Option<&SignedMessage> {
        self.signed_message.as_ref()
    }

    /// encode as a column tuple in the column order of the latest schema version.
    pub fn to_row(&self) -> Vec<ColumnValue> {
        let entity = SchemaVersion::LATEST.iou_entity();
        entity
            .columns
            .iter()
            .map(|column| self.column_value(column.field))
            .collect()
    }

    /// decode a column tuple written under the latest schema version.
    pub fn from_row(row: &[ColumnValue]) -> Result<Self> {
        Self::from_versioned_row(SchemaVersion::LATEST, row)
    }

    /// decode a column tuple written under a specific schema version.
    pub fn from_versioned_row(version: SchemaVersion, row: &[ColumnValue]) -> Result<Self> {
        let entity = version.iou_entity();
        check_row(entity, row)?;

        let cells = RowCells { entity, row };
        Ok(Self {
            lender: cells.text("lender")?,
            borrower: cells.text("borrower")?,
            value: cells.int32("value")?.ok_or_else(|| Error::NullColumn {
                column: cells.column_name("value"),
            })?,
            linear_id: cells.uuid("linear_id")?.map(LinearId::from_uuid),
            public_key: cells.bytes("public_key")?.map(PublicKey::from_bytes),
            signed_message: cells.bytes("signed_message")?.map(SignedMessage::from_bytes),
        })
    }

    fn column_value(&self, field: &str) -> ColumnValue {
        match field {
            "lender" => self.lender.clone().into(),
            "borrower" => self.borrower.clone().into(),
            "value" => self.value.into(),
            "linear_id" => self.linear_id.map(|id| id.as_uuid()).into(),
            "public_key" => self.public_key.clone().map(PublicKey::into_bytes).into(),
            "signed_message" => self
                .signed_message
                .clone()
                .map(SignedMessage::into_bytes)
                .into(),
            _ => ColumnValue::Null,
        }
    }
}

/// field lookup over a row laid out by an entity's column descriptors.
///
/// a field the entity does not declare reads as null.
struct RowCells<'a> {
    entity: &'a EntityDescriptor,
    row: &'a [ColumnValue],
}

impl<'a> RowCells<'a> {
    fn column_name(&self, field: &'static str) -> &'static str {
        self.entity
            .columns
            .iter()
            .find(|c| c.field == field)
            .map_or(field, |c| c.column)
    }

    fn cell(&self, field: &'static str) -> Option<&'a ColumnValue> {
        let index = self.entity.columns.iter().position(|c| c.field == field)?;
        self.row.get(index)
    }

    fn mismatch<T>(&self, field: &'static str, expected: ColumnType) -> Result<T> {
        Err(Error::ColumnType {
            column: self.column_name(field),
            expected,
        })
    }

    fn text(&self, field: &'static str) -> Result<Option<String>> {
        match self.cell(field) {
            None | Some(ColumnValue::Null) => Ok(None),
            Some(ColumnValue::Text(s)) => Ok(Some(s.clone())),
            Some(_) => self.mismatch(field, ColumnType::Text),
        }
    }

    fn int32(&self, field: &'static str) -> Result<Option<i32>> {
        match self.cell(field) {
            None | Some(ColumnValue::Null) => Ok(None),
            Some(ColumnValue::Int32(v)) => Ok(Some(*v)),
            Some(_) => self.mismatch(field, ColumnType::Integer32),
        }
    }

    fn uuid(&self, field: &'static str) -> Result<Option<Uuid>> {
        match self.cell(field) {
            None | Some(ColumnValue::Null) => Ok(None),
            Some(ColumnValue::Uuid(u)) => Ok(Some(*u)),
            Some(_) => self.mismatch(field, ColumnType::Uuid),
        }
    }

    fn bytes(&self, field: &'static str) -> Result<Option<Vec<u8>>> {
        match self.cell(field) {
            None | Some(ColumnValue::Null) => Ok(None),
            Some(ColumnValue::Bytes(b)) => Ok(Some(b.clone())),
            Some(_) => self.mismatch(field, ColumnType::Bytes),
        }
    }
}

/// check arity, nullability and types of a row against an entity's columns.
fn check_row(entity: &EntityDescriptor, row: &[ColumnValue]) -> Result<()> {
    if row.len() != entity.columns.len() {
        return Err(Error::ColumnCount {
            expected: entity.columns.len(),
            actual: row.len(),
        });
    }

    for (column, value) in entity.columns.iter().zip(row) {
        match value.column_type() {
            None if !column.nullable => {
                return Err(Error::NullColumn {
                    column: column.column,
                });
            }
            None => {}
            Some(actual) if actual != column.column_type => {
                return Err(Error::ColumnType {
                    column: column.column,
                    expected: column.column_type,
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_id() -> LinearId {
        LinearId::from_uuid(Uuid::parse_str("6f1c0d1e-5b8a-4c3e-9f2d-1a2b3c4d5e6f").unwrap())
    }

    fn alice_owes_bob() -> IouRecord {
        IouRecord::new(
            "Alice",
            "Bob",
            100,
            fixed_id(),
            Some(PublicKey::from_bytes(vec![0x01, 0x02])),
            Some(SignedMessage::from_bytes(vec![0xaa, 0xbb])),
        )
    }

    #[test]
    fn test_accessors_return_supplied_values() {
        let record = alice_owes_bob();
        assert_eq!(record.lender(), Some("Alice"));
        assert_eq!(record.borrower(), Some("Bob"));
        assert_eq!(record.value(), 100);
        assert_eq!(record.linear_id(), Some(fixed_id()));
        assert_eq!(record.public_key().unwrap().as_bytes(), &[0x01, 0x02]);
        assert_eq!(record.signed_message().unwrap().as_bytes(), &[0xaa, 0xbb]);
        assert!(!record.is_placeholder());
    }

    #[test]
    fn test_placeholder_is_all_null() {
        let record = IouRecord::placeholder();
        assert_eq!(record.lender(), None);
        assert_eq!(record.borrower(), None);
        assert_eq!(record.value(), 0);
        assert_eq!(record.linear_id(), None);
        assert!(record.public_key().is_none());
        assert!(record.signed_message().is_none());
        assert!(record.is_placeholder());
        assert_eq!(IouRecord::default(), record);
    }

    #[test]
    fn test_versions_share_linear_id() {
        let id = LinearId::new_random();
        let first = IouRecord::new("Alice", "Bob", 100, id, None, None);
        let second = IouRecord::new("Alice", "Bob", 60, id, None, None);
        assert_ne!(first.value(), second.value());
        assert_eq!(first.linear_id(), second.linear_id());
    }

    #[test]
    fn test_negative_value_is_accepted() {
        // validation belongs to the caller
        let record = IouRecord::new("Alice", "Bob", -5, fixed_id(), None, None);
        assert_eq!(record.value(), -5);

        let zero = IouRecord::new("", "", 0, fixed_id(), None, None);
        assert_eq!(zero.value(), 0);
        assert_eq!(zero.lender(), Some(""));
    }

    #[test]
    fn test_row_layout() {
        let row = alice_owes_bob().to_row();
        assert_eq!(
            row,
            vec![
                ColumnValue::Text("Alice".to_string()),
                ColumnValue::Text("Bob".to_string()),
                ColumnValue::Int32(100),
                ColumnValue::Uuid(fixed_id().as_uuid()),
                ColumnValue::Bytes(vec![0x01, 0x02]),
                ColumnValue::Bytes(vec![0xaa, 0xbb]),
            ]
        );
        assert_eq!(IouRecord::from_row(&row).unwrap(), alice_owes_bob());
    }

    #[test]
    fn test_placeholder_row() {
        let row = IouRecord::placeholder().to_row();
        assert_eq!(row[2], ColumnValue::Int32(0));
        assert!(row.iter().enumerate().all(|(i, v)| i == 2 || v.is_null()));
        assert!(IouRecord::from_row(&row).unwrap().is_placeholder());
    }

    #[test]
    fn test_from_row_rejects_wrong_arity() {
        let mut row = alice_owes_bob().to_row();
        row.pop();
        assert_eq!(
            IouRecord::from_row(&row),
            Err(Error::ColumnCount {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_from_row_rejects_null_value() {
        let mut row = alice_owes_bob().to_row();
        row[2] = ColumnValue::Null;
        assert_eq!(
            IouRecord::from_row(&row),
            Err(Error::NullColumn { column: "value" })
        );
    }

    #[test]
    fn test_from_row_rejects_type_mismatch() {
        let mut row = alice_owes_bob().to_row();
        row[3] = ColumnValue::Text("not a uuid column".to_string());
        assert_eq!(
            IouRecord::from_row(&row),
            Err(Error::ColumnType {
                column: "linear_id",
                expected: crate::ColumnType::Uuid
            })
        );
    }

    #[test]
    fn test_row_cells_report_the_column_not_a_default() {
        let row = alice_owes_bob().to_row();
        let cells = RowCells {
            entity: SchemaVersion::V1.iou_entity(),
            row: &row,
        };
        assert_eq!(cells.int32("value"), Ok(Some(100)));
        assert_eq!(
            cells.text("value"),
            Err(Error::ColumnType {
                column: "value",
                expected: ColumnType::Text
            })
        );
        assert_eq!(
            cells.bytes("lender"),
            Err(Error::ColumnType {
                column: "lender",
                expected: ColumnType::Bytes
            })
        );
        assert_eq!(cells.text("currency"), Ok(None));
    }

    #[test]
    fn test_versioned_decode_matches_latest() {
        let row = alice_owes_bob().to_row();
        assert_eq!(
            IouRecord::from_versioned_row(SchemaVersion::V1, &row).unwrap(),
            IouRecord::from_row(&row).unwrap()
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn accessors_return_exactly_what_was_supplied(
            lender in ".*",
            borrower in ".*",
            value in any::<i32>(),
            id in any::<u128>(),
            key in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..64)),
            sig in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..256)),
        ) {
            let linear_id = LinearId::from_uuid(Uuid::from_u128(id));
            let record = IouRecord::new(
                lender.clone(),
                borrower.clone(),
                value,
                linear_id,
                key.clone().map(PublicKey::from_bytes),
                sig.clone().map(SignedMessage::from_bytes),
            );

            prop_assert_eq!(record.lender(), Some(lender.as_str()));
            prop_assert_eq!(record.borrower(), Some(borrower.as_str()));
            prop_assert_eq!(record.value(), value);
            prop_assert_eq!(record.linear_id(), Some(linear_id));
            prop_assert_eq!(record.public_key().map(|k| k.as_bytes().to_vec()), key);
            prop_assert_eq!(record.signed_message().map(|s| s.as_bytes().to_vec()), sig);

            // the row codec must not coerce anything either
            let decoded = IouRecord::from_row(&record.to_row()).unwrap();
            prop_assert_eq!(decoded, record);
        }

        #[test]
        fn arbitrary_rows_never_panic(len in 0usize..10, n in any::<i32>()) {
            let row = vec![ColumnValue::Int32(n); len];
            let _ = IouRecord::from_row(&row);
        }
    }
}
