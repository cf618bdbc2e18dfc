use regtrends::melt::melt_monthly;
use regtrends::normalize::{normalize_manufacturer, normalize_monthly, normalize_vehicle_class};
use regtrends::records::Category;
use regtrends::report::{ReportFilters, SourceData, assemble};
use regtrends::sheet::{CellValue, RawSheet};

fn t(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn n(v: f64) -> CellValue {
    CellValue::Number(v)
}

fn manufacturer_sheet(rows: &[(&str, f64)]) -> RawSheet {
    // Mimics the real extracts: title rows, then the header with a blank
    // label over the maker column, then data with a footnote at the end.
    let mut grid = vec![
        vec![t("Vehicle Registration Report")],
        vec![CellValue::Empty],
        vec![t("Maker Wise Data")],
        vec![CellValue::Empty],
        vec![
            t("S No"),
            CellValue::Empty,
            t("4WIC"),
            t("LMV"),
            t("MMV"),
            t("HMV"),
            t("TOTAL"),
        ],
    ];

    for (i, (maker, total)) in rows.iter().enumerate() {
        grid.push(vec![
            n(i as f64 + 1.0),
            t(maker),
            n(0.0),
            n(*total),
            n(0.0),
            n(0.0),
            n(*total),
        ]);
    }
    grid.push(vec![CellValue::Empty, CellValue::Empty]);
    grid.push(vec![t("Note:"), CellValue::Empty]);

    RawSheet::from_rows(grid)
}

fn monthly_sheet(rows: &[(&str, [f64; 6])]) -> RawSheet {
    let mut grid = vec![
        vec![t("Monthly Registrations")],
        vec![CellValue::Empty],
        vec![CellValue::Empty],
        vec![
            t("S No"),
            CellValue::Empty,
            t("JAN"),
            t("FEB"),
            t("MAR"),
            t("APR"),
            t("MAY"),
            t("JUN"),
            t("TOTAL"),
        ],
    ];

    for (i, (maker, values)) in rows.iter().enumerate() {
        let mut row = vec![n(i as f64 + 1.0), t(maker)];
        row.extend(values.iter().map(|v| n(*v)));
        row.push(n(values.iter().sum()));
        grid.push(row);
    }

    RawSheet::from_rows(grid)
}

fn class_sheet(rows: &[(&str, f64)]) -> RawSheet {
    let mut grid = vec![
        vec![t("Vehicle Class Wise Data")],
        vec![CellValue::Empty],
        vec![CellValue::Empty],
        vec![CellValue::Empty],
        vec![
            t("S No"),
            CellValue::Empty,
            t("2WIC"),
            t("2WN"),
            t("2WT"),
            t("TOTAL"),
        ],
    ];

    for (i, (class, total)) in rows.iter().enumerate() {
        grid.push(vec![n(i as f64 + 1.0), t(class), n(*total), n(0.0), n(0.0), n(*total)]);
    }

    RawSheet::from_rows(grid)
}

#[test]
fn test_full_pipeline() {
    let m2024 = manufacturer_sheet(&[("MAKER A", 100.0), ("MAKER B", 200.0)]);
    let m2025 = manufacturer_sheet(&[("MAKER A", 150.0), ("MAKER C", 60.0)]);
    let q2024 = monthly_sheet(&[("MAKER A", [10.0, 20.0, 30.0, 15.0, 15.0, 30.0])]);
    let classes_2w = class_sheet(&[("M-CYCLE/SCOOTER", 500.0)]);

    let mut data = SourceData::default();
    data.manufacturers
        .extend(normalize_manufacturer(&m2024, 4, 2024).unwrap());
    data.manufacturers
        .extend(normalize_manufacturer(&m2025, 4, 2025).unwrap());
    data.classes.extend(
        normalize_vehicle_class(&classes_2w, 4, 2025, Category::TwoWheeler).unwrap(),
    );
    let wide = normalize_monthly(&q2024, 3, 2024).unwrap();
    data.monthly.extend(melt_monthly(&wide));

    let report = assemble(&data, &ReportFilters::default()).unwrap();

    // union of makers across both years
    assert_eq!(report.yoy.len(), 3);

    let a = report.yoy.iter().find(|r| r.maker == "MAKER A").unwrap();
    assert_eq!(a.prior_total, 100.0);
    assert_eq!(a.current_total, 150.0);
    assert_eq!(a.growth_pct, 50.0);

    // new entrant: zero prior substituted with 1
    let c = report.yoy.iter().find(|r| r.maker == "MAKER C").unwrap();
    assert_eq!(c.growth_pct, 6000.0);

    // departed maker still present with a zeroed current year
    let b = report.yoy.iter().find(|r| r.maker == "MAKER B").unwrap();
    assert_eq!(b.current_total, 0.0);
    assert_eq!(b.growth_pct, -100.0);

    // six months melt into two quarters: 60 then 60
    assert_eq!(report.qoq.len(), 2);
    assert_eq!(report.qoq[0].label, "2024-Q1");
    assert_eq!(report.qoq[0].value, 60.0);
    assert_eq!(report.qoq[0].growth_pct, None);
    assert_eq!(report.qoq[1].label, "2024-Q2");
    assert_eq!(report.qoq[1].growth_pct, Some(0.0));

    assert_eq!(report.category_totals[&Category::TwoWheeler], 500.0);
    assert_eq!(report.insights.top_maker, "MAKER C");
    assert_eq!(report.insights.bottom_maker, "MAKER B");
}
