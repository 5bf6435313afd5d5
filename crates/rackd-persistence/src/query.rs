//! Generic filter/sort/paginate application over a `Select<E>`
//!
//! Field names coming off the wire are resolved through a per-entity
//! allow-list of typed columns (`query_field` in each entity module). A
//! field outside the allow-list rejects the request at resolution time;
//! nothing is ever looked up dynamically against untrusted input.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{Condition, Order, QueryFilter, QueryOrder, QuerySelect, Select};

use rackd_api::{FilterDescriptor, FilterOperator, PageWindow, SortDescriptor, SortDirection};
use rackd_common::RackdError;

/// Typed view of a filterable field: the column plus how raw string values
/// against it must be interpreted.
#[derive(Debug, Clone, Copy)]
pub struct QueryField<C> {
    pub column: C,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl<C> QueryField<C> {
    pub fn text(column: C) -> Self {
        Self {
            column,
            kind: FieldKind::Text,
        }
    }

    pub fn integer(column: C) -> Self {
        Self {
            column,
            kind: FieldKind::Integer,
        }
    }
}

fn integer_value(field: &str, raw: &str) -> Result<i64, RackdError> {
    raw.trim().parse::<i64>().map_err(|_| {
        RackdError::Filter(format!(
            "field '{}' expects an integer value, got '{}'",
            field, raw
        ))
    })
}

/// Build the SQL predicate for one filter descriptor.
fn predicate<C: ColumnTrait>(
    descriptor: &FilterDescriptor,
    field: &QueryField<C>,
) -> Result<SimpleExpr, RackdError> {
    let expr = match (descriptor.operator, field.kind) {
        (FilterOperator::Eq, FieldKind::Text) => field.column.eq(descriptor.value.as_str()),
        (FilterOperator::Gt, FieldKind::Text) => field.column.gt(descriptor.value.as_str()),
        (FilterOperator::Ge, FieldKind::Text) => field.column.gte(descriptor.value.as_str()),
        (FilterOperator::Lt, FieldKind::Text) => field.column.lt(descriptor.value.as_str()),
        (FilterOperator::Le, FieldKind::Text) => field.column.lte(descriptor.value.as_str()),
        (FilterOperator::Eq, FieldKind::Integer) => field
            .column
            .eq(integer_value(&descriptor.field, &descriptor.value)?),
        (FilterOperator::Gt, FieldKind::Integer) => field
            .column
            .gt(integer_value(&descriptor.field, &descriptor.value)?),
        (FilterOperator::Ge, FieldKind::Integer) => field
            .column
            .gte(integer_value(&descriptor.field, &descriptor.value)?),
        (FilterOperator::Lt, FieldKind::Integer) => field
            .column
            .lt(integer_value(&descriptor.field, &descriptor.value)?),
        (FilterOperator::Le, FieldKind::Integer) => field
            .column
            .lte(integer_value(&descriptor.field, &descriptor.value)?),
        (FilterOperator::In, FieldKind::Text) => field.column.is_in(descriptor.values()),
        (FilterOperator::In, FieldKind::Integer) => {
            let values = descriptor
                .values()
                .into_iter()
                .map(|v| integer_value(&descriptor.field, v))
                .collect::<Result<Vec<_>, _>>()?;
            field.column.is_in(values)
        }
        (FilterOperator::Btw, kind) => {
            let values = descriptor.values();
            if values.len() != 2 {
                return Err(RackdError::Filter(format!(
                    "btw on '{}' expects exactly two comma-separated values",
                    descriptor.field
                )));
            }
            match kind {
                FieldKind::Text => field.column.between(values[0], values[1]),
                FieldKind::Integer => field.column.between(
                    integer_value(&descriptor.field, values[0])?,
                    integer_value(&descriptor.field, values[1])?,
                ),
            }
        }
        (FilterOperator::Lk, FieldKind::Text) => {
            Expr::expr(Func::lower(Expr::col(field.column)))
                .like(format!("%{}%", descriptor.value.to_lowercase()))
        }
        (FilterOperator::Lk, FieldKind::Integer) => {
            return Err(RackdError::Filter(format!(
                "lk requires a text field, '{}' is numeric",
                descriptor.field
            )));
        }
    };

    Ok(expr)
}

/// Apply parsed filters, resolving fields through the entity allow-list.
pub fn apply_filters<E: EntityTrait>(
    select: Select<E>,
    filters: &[FilterDescriptor],
    resolve: impl Fn(&str) -> Option<QueryField<E::Column>>,
) -> Result<Select<E>, RackdError> {
    if filters.is_empty() {
        return Ok(select);
    }

    let mut condition = Condition::all();
    for descriptor in filters {
        let field = resolve(&descriptor.field).ok_or_else(|| {
            RackdError::Filter(format!("unknown filter field '{}'", descriptor.field))
        })?;
        condition = condition.add(predicate(descriptor, &field)?);
    }

    Ok(select.filter(condition))
}

/// Apply parsed sort descriptors in list order.
pub fn apply_sort<E: EntityTrait>(
    mut select: Select<E>,
    sort: &[SortDescriptor],
    resolve: impl Fn(&str) -> Option<QueryField<E::Column>>,
) -> Result<Select<E>, RackdError> {
    for descriptor in sort {
        let field = resolve(&descriptor.field).ok_or_else(|| {
            RackdError::Sort(format!("unknown sort field '{}'", descriptor.field))
        })?;
        let order = match descriptor.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        select = select.order_by(field.column, order);
    }

    Ok(select)
}

/// Apply the pagination window. `per_page = None` leaves the query
/// unbounded; `per_page = 0` yields an empty page.
pub fn apply_window<E: EntityTrait>(select: Select<E>, window: &PageWindow) -> Select<E> {
    match window.per_page {
        None => select,
        Some(per_page) => select.offset(window.offset()).limit(per_page),
    }
}

/// Validate a `fields=` selection against the scalar allow-list plus the
/// entity's relation names.
pub fn validate_fields<C>(
    fields: &[String],
    resolve: impl Fn(&str) -> Option<QueryField<C>>,
    relations: &[&str],
) -> Result<(), RackdError> {
    for field in fields {
        if resolve(field).is_none() && !relations.contains(&field.as_str()) {
            return Err(RackdError::Filter(format!(
                "unknown field '{}' in fields selection",
                field
            )));
        }
    }

    Ok(())
}
