#[cfg(test)]
mod results_grid_tests {
    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use sqlcli::core::db::driver::{ConnectParams, Driver, ExecuteOptions};
    use sqlcli::core::db::sqlite::SqliteDriver;
    use sqlcli::core::db::value::{Payload, Row, Value};
    use sqlcli::results_grid::{render_rows, ResultsGrid};

    fn row(cells: Vec<(&str, Value)>) -> Row {
        cells.into_iter().collect()
    }

    #[test]
    fn test_single_column_table() {
        let rows = vec![
            row(vec![("id", Value::Integer(1))]),
            row(vec![("id", Value::Integer(2))]),
        ];
        assert_snapshot!(render_rows(&rows), @r"
        |----|
        | id |
        |----|
        |  1 |
        |  2 |
        |----|
        ");
    }

    #[test]
    fn test_mixed_value_rendering() {
        let ts = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 60)
            .unwrap();
        let rows = vec![
            row(vec![
                ("id", Value::Integer(1)),
                ("name", Value::Text("Ann".into())),
                ("score", Value::Real(9.5)),
                ("avatar", Value::Blob(vec![1, 2, 3])),
                (
                    "seen",
                    Value::Timestamp {
                        parsed: ts,
                        raw: "2020-01-02 03:04:05.060".into(),
                    },
                ),
            ]),
            row(vec![
                ("id", Value::Integer(22)),
                ("name", Value::Null),
                ("score", Value::Null),
                ("avatar", Value::Null),
                ("seen", Value::Null),
            ]),
        ];
        assert_snapshot!(render_rows(&rows), @r"
        |----|------|-------|------------|--------------------------|
        | id | name | score |     avatar |                     seen |
        |----|------|-------|------------|--------------------------|
        |  1 |  Ann |   9.5 | Buf[1,2,3] | 2020-01-02T03:04:05.060Z |
        | 22 | null |  null |       null |                     null |
        |----|------|-------|------------|--------------------------|
        ");
    }

    #[test]
    fn test_wide_column_is_clamped() {
        let text = "abcdefghij".repeat(5);
        let rows = vec![row(vec![("note", Value::Text(text))])];
        let grid = ResultsGrid::from_rows(&rows);
        assert_eq!(grid.column_widths(), vec![40]);
        assert_snapshot!(grid.render(), @r"
        |------------------------------------------|
        |                                     note |
        |------------------------------------------|
        | abcdefghijabcdefghijabcdefghijabcdef ... |
        |------------------------------------------|
        ");
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(render_rows(&[]), "Returned 0 rows.");
    }

    #[test]
    fn test_rows_from_sqlite() {
        let mut conn = SqliteDriver.connect(&ConnectParams::default()).unwrap();
        let opts = ExecuteOptions::default();
        conn.execute("CREATE TABLE pets (name TEXT, legs INTEGER)", &opts)
            .unwrap();
        conn.execute("INSERT INTO pets VALUES ('cat', 4), ('snake', 0)", &opts)
            .unwrap();
        let record = conn
            .execute("SELECT name, legs FROM pets ORDER BY name", &opts)
            .unwrap();
        let rows = match record.payload {
            Payload::Rows(rows) => rows,
            other => panic!("Expected rows, got {:?}", other),
        };
        assert_snapshot!(render_rows(&rows), @r"
        |-------|------|
        |  name | legs |
        |-------|------|
        |   cat |    4 |
        | snake |    0 |
        |-------|------|
        ");
    }
}
