use c4_hash::{BucketTable, Config, Decode, Encode, StateVector};
use rand::Rng;
use test_log::test;

const ITEM_COUNT: usize = 5_000;

fn random_states(count: usize) -> Vec<StateVector> {
    let mut rng = rand::rng();

    (0..count)
        .map(|_| {
            let mut fields = [0; 10];
            for field in &mut fields {
                *field = rng.random_range(0..729);
            }
            StateVector::from(fields)
        })
        .collect()
}

fn assert_same_buckets(expected: &BucketTable, actual: &BucketTable) {
    assert_eq!(expected.modulus(), actual.modulus());
    assert_eq!(expected.len(), actual.len());
    assert_eq!(expected.iter().count(), actual.iter().count());

    for ((index, bucket), (actual_index, actual_bucket)) in expected.iter().zip(actual.iter()) {
        assert_eq!(index, actual_index);
        assert_eq!(bucket.len(), actual_bucket.len());

        for (state, actual_state) in bucket.states().iter().zip(actual_bucket.states()) {
            assert_eq!(
                state.persisted().collect::<Vec<_>>(),
                actual_state.persisted().collect::<Vec<_>>()
            );
            assert_eq!(0, actual_state.results()[2]);
        }
    }
}

#[test]
fn table_save_and_open() -> c4_hash::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("positions.c4hash");

    let table = c4_hash::build_table(Config::new(), random_states(ITEM_COUNT))?;
    assert!(!table.stats().has_rejections());

    table.save(&path)?;
    let reloaded = BucketTable::open(&path)?;

    assert_same_buckets(&table, &reloaded);
    assert_eq!(table.stats().max_occupancy(), reloaded.stats().max_occupancy());

    for (_, bucket) in table.iter() {
        for state in bucket.states() {
            assert!(reloaded.contains(state));
        }
    }

    Ok(())
}

#[test]
fn table_encode_decode_small_modulus() -> c4_hash::Result<()> {
    let table = c4_hash::build_table(Config::new().modulus(97), random_states(300))?;
    let capacity = table.bucket_capacity();

    let bytes = table.encode_into_vec();
    let reloaded = BucketTable::decode_with_capacity(&mut &bytes[..], capacity)?;

    assert_same_buckets(&table, &reloaded);

    let reencoded = reloaded.encode_into_vec();
    assert_eq!(bytes, reencoded);

    Ok(())
}

#[test]
fn table_file_layout() -> c4_hash::Result<()> {
    let mut table = Config::new().build()?;

    let a = StateVector::from([1, 0, 0, 0, 0, 0, 0, 3, 2, 1]);
    let b = StateVector::from([1, 0, 0, 0, 0, 0, 0, 6, 5, 4]);
    let _ = table.insert_state(a);
    let _ = table.insert_state(b);

    let text = String::from_utf8(table.encode_into_vec()).expect("should be utf-8");

    assert_eq!(
        "2000003\n116547\n2\n1 0 0 0 0 0 0 3 2\n1 0 0 0 0 0 0 6 5\n",
        text
    );

    let reloaded = BucketTable::decode_from(&mut text.as_bytes())?;
    assert_eq!(Some(2), reloaded.bucket(116_547).map(c4_hash::Bucket::len));

    Ok(())
}

#[test]
fn save_replaces_existing_file() -> c4_hash::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("positions.c4hash");

    std::fs::write(&path, "garbage")?;

    let table = c4_hash::build_table(Config::new().modulus(11), random_states(10))?;
    table.save(&path)?;

    let reloaded = BucketTable::decode_with_capacity(
        &mut std::io::BufReader::new(std::fs::File::open(&path)?),
        table.bucket_capacity(),
    )?;
    assert_same_buckets(&table, &reloaded);

    Ok(())
}

#[test]
fn open_rejects_oversized_header() -> c4_hash::Result<()> {
    let folder = tempfile::tempdir()?;
    let path = folder.path().join("corrupt.c4hash");

    std::fs::write(&path, "9000000000000000000\n0\n1\n0 0 0 0 0 0 0 0 0\n")?;

    assert!(matches!(
        BucketTable::open(&path),
        Err(c4_hash::Error::Decode(c4_hash::DecodeError::InvalidHeader(_)))
    ));

    Ok(())
}
