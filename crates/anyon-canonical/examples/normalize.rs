use anyon_canonical::{attach_hashes, hash_normalized, normalized_canonical_dump, NumericPolicy, Value};

fn main() {
    let payload = match Value::from_json_str(
        r#"{
            "name": "toric_code",
            "objects": ["1", "e", "m", "em"],
            "qdim": [1.0, 1.0, 1.0, 1.0],
            "S": [[0.5000000000001, 0.5], [0.5, -0.49999999999998]],
            "twist": [1.0, -1.0000000000000002]
        }"#,
    ) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("invalid payload: {}", err);
            std::process::exit(1);
        }
    };
    let policy = NumericPolicy::default();

    match normalized_canonical_dump(&payload, &policy) {
        Ok(canonical) => println!("{}", canonical),
        Err(err) => {
            eprintln!("normalization failed: {}", err);
            std::process::exit(1);
        }
    }

    match hash_normalized(&payload, &policy) {
        Ok(digest) => println!("{}", digest),
        Err(err) => {
            eprintln!("hashing failed: {}", err);
            std::process::exit(1);
        }
    }

    if let Value::Object(mut map) = payload {
        match attach_hashes(&mut map, None) {
            Ok(filled) => println!("attached: {}", filled.join(", ")),
            Err(err) => eprintln!("attach failed: {}", err),
        }
    }
}
