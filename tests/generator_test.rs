mod common;

#[test]
fn test_generate_simple_script() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("generated.csv");
    common::generate_script(&output_path, 5).expect("Failed to generate script");

    let content = std::fs::read_to_string(&output_path).expect("Failed to read file");
    // Header + 5 create/sell pairs = 11 lines
    assert_eq!(content.lines().count(), 11);
}

#[test]
fn test_generate_script_distribution() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("dist.csv");
    common::generate_script(&output_path, 500).expect("Failed to generate script");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&output_path)
        .expect("Failed to open CSV");

    let mut products = std::collections::HashSet::new();
    let mut payment_types = std::collections::HashSet::new();
    let mut restocks = 0;
    for result in reader.records() {
        let record = result.expect("Failed to read record");
        match &record[0] {
            "sell" => {
                let id: u32 = record[1].parse().expect("Failed to parse product id");
                assert!((1..=10).contains(&id));
                products.insert(id);
            }
            "create" => {
                payment_types.insert(record[3].to_string());
            }
            "restock_all" => restocks += 1,
            other => panic!("unexpected command {other}"),
        }
    }

    assert_eq!(restocks, 10);
    assert_eq!(payment_types.len(), 2, "Should have seen both payment types");
    assert!(products.len() >= 8, "Should have seen most products");
}
