// Tiny query building helpers for the statements whose
// shape depends on the request (listing with or without
// a status filter). Values always go through placeholders,
// only column and table names end up in the string.

pub enum Order {
  Desc
}

pub struct OrderBy {
  pub order: Order,
  pub fields: Vec<String>
}

impl OrderBy {
  pub fn new(order: Order, fields: Vec<String>) -> Self {
    OrderBy {
      order,
      fields
    }
  }
}

// The "q_" in front of argument names is just because
// "where" is a reserved keyword in Rust.
// LIMIT and OFFSET are written as placeholders, the caller
// has to bind them after the WHERE parameters.
pub fn select_query_builder(
  q_fields: &[&str],
  q_from: &str,
  q_where: &[String],
  q_order: Option<OrderBy>,
  paginated: bool
) -> String {
  let mut query = format!(
    "SELECT {} FROM {} ",
    q_fields.join(","),
    q_from
  );
  if !q_where.is_empty() {
    query.push_str(
      &format!(
        "WHERE {} ",
        q_where.join(" AND ")
      )
    );
  }
  if let Some(order) = q_order {
    let direction = match order.order {
      Order::Desc => "DESC"
    };
    let clauses: Vec<String> = order.fields.iter()
      .map(|f| format!("{} {}", f, direction))
      .collect();
    query.push_str(&format!("ORDER BY {} ", clauses.join(",")));
  }
  if paginated {
    query.push_str("LIMIT ? OFFSET ? ");
  }
  query
}

pub fn generate_field_equal_qmark(name: &str) -> String {
  format!("{} = ?", name)
}
