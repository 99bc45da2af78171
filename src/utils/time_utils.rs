use chrono::{Local, TimeZone};

// Display format for article dates: dd/MM/yyyy HH:mm:ssZ
// chrono formatting reference:
// https://docs.rs/chrono/latest/chrono/format/strftime/index.html
const DATE_FORMAT_STANDARD: &str = "%d/%m/%Y %k:%M:%S%:z";
const DATE_FORMAT_USCOMPACT: &str = "%Y-%m-%d";

pub enum DateFormat {
  Standard,
  USCompact,
}

// Timestamps are stored in milliseconds so that an edit
// made right after a creation still gets a later date.
pub fn timestamp_to_date_string(timestamp_ms: i64, format: DateFormat) -> String {
  let format_str = match format {
    DateFormat::Standard => DATE_FORMAT_STANDARD,
    DateFormat::USCompact => DATE_FORMAT_USCOMPACT,
  };
  match Local.timestamp_millis_opt(timestamp_ms).single() {
    Some(d) => d.format(format_str).to_string(),
    // Only happens with garbage in the database.
    None => String::new()
  }
}

pub fn current_timestamp() -> i64 {
  Local::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  #[test]
  fn local_time_formats_as_expected() {
    // Build the expectation in local time so the test
    // doesn't depend on the machine timezone.
    let local = Local.from_local_datetime(
      &NaiveDate::from_ymd_opt(2021, 3, 7).unwrap().and_hms_opt(21, 59, 0).unwrap()
    ).unwrap();
    let result = timestamp_to_date_string(
      local.timestamp_millis(), 
      DateFormat::USCompact
    );
    assert_eq!("2021-03-07", result);
    let result = timestamp_to_date_string(
      local.timestamp_millis(), 
      DateFormat::Standard
    );
    assert!(result.starts_with("07/03/2021 21:59:00"));
  }

  #[test]
  fn current_timestamp_is_in_milliseconds() {
    let now = current_timestamp();
    assert!(now > Local::now().timestamp() * 100);
  }
}
