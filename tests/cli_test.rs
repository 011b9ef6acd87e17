use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

type STDRESULT = Result<(), Box<dyn std::error::Error>>;

fn write_pgm(path: &std::path::Path, side: u32, pixels: &[u8]) -> STDRESULT {
    let mut f = std::fs::File::create(path)?;
    writeln!(f, "P5")?;
    writeln!(f, "{side} {side}")?;
    writeln!(f, "255")?;
    f.write_all(pixels)?;
    Ok(())
}

#[test]
fn compress_then_decompress_roundtrips() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    let qtc_out = temp_dir.path().join("out.qtc");
    let pgm_out = temp_dir.path().join("out.pgm");

    let pixels: Vec<u8> = (0..64u32).map(|i| (i * 4) as u8).collect();
    write_pgm(&pgm_in, 8, &pixels)?;

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg(&pgm_in)
        .arg("-o")
        .arg(&qtc_out)
        .assert()
        .success();
    assert!(qtc_out.exists());

    Command::cargo_bin("qtc")?
        .arg("-u")
        .arg("-i")
        .arg(&qtc_out)
        .arg("-o")
        .arg(&pgm_out)
        .assert()
        .success();

    let round_tripped = std::fs::read(&pgm_out)?;
    let original = std::fs::read(&pgm_in)?;
    assert_eq!(round_tripped, original);
    Ok(())
}

#[test]
fn lossy_alpha_shrinks_output() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    let lossless_out = temp_dir.path().join("lossless.qtc");
    let lossy_out = temp_dir.path().join("lossy.qtc");

    #[rustfmt::skip]
    let pixels: Vec<u8> = vec![
        99,100,100,101, 120,121,119,120,
        100,101,99,100, 121,119,120,121,
        100,100,101,99, 119,120,121,119,
        101,99,100,100, 120,121,120,121,
        10,11,9,10,     200,201,199,200,
        11,9,10,11,     201,199,200,201,
        10,10,11,9,     199,200,201,199,
        11,9,10,10,     200,201,200,201,
    ];
    write_pgm(&pgm_in, 8, &pixels)?;

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg(&pgm_in)
        .arg("-o")
        .arg(&lossless_out)
        .assert()
        .success();

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg(&pgm_in)
        .arg("-o")
        .arg(&lossy_out)
        .arg("-a")
        .arg("8.0")
        .assert()
        .success();

    let lossless_len = std::fs::metadata(&lossless_out)?.len();
    let lossy_len = std::fs::metadata(&lossy_out)?.len();
    assert!(lossy_len <= lossless_len);
    Ok(())
}

#[test]
fn grid_flag_emits_partition_raster() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    let qtc_out = temp_dir.path().join("out.qtc");
    let grid_out = temp_dir.path().join("grid.pgm");

    write_pgm(&pgm_in, 2, &[1, 2, 3, 4])?;

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg(&pgm_in)
        .arg("-o")
        .arg(&qtc_out)
        .arg("-g")
        .arg(&grid_out)
        .assert()
        .success();

    assert!(grid_out.exists());
    let data = std::fs::read(&grid_out)?;
    assert!(data.starts_with(b"P5"));
    Ok(())
}

#[test]
fn grid_flag_emits_partition_raster_on_decompress() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    let qtc_out = temp_dir.path().join("out.qtc");
    let pgm_out = temp_dir.path().join("out.pgm");
    let grid_out = temp_dir.path().join("grid.pgm");

    write_pgm(&pgm_in, 2, &[1, 2, 3, 4])?;

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg(&pgm_in)
        .arg("-o")
        .arg(&qtc_out)
        .assert()
        .success();

    Command::cargo_bin("qtc")?
        .arg("-u")
        .arg("-i")
        .arg(&qtc_out)
        .arg("-o")
        .arg(&pgm_out)
        .arg("-g")
        .arg(&grid_out)
        .assert()
        .success();

    assert!(grid_out.exists());
    let data = std::fs::read(&grid_out)?;
    assert!(data.starts_with(b"P5"));
    Ok(())
}

#[test]
fn rejects_specifying_neither_compress_nor_decompress() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    write_pgm(&pgm_in, 2, &[1, 2, 3, 4])?;

    Command::cargo_bin("qtc")?
        .arg("-i")
        .arg(&pgm_in)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn rejects_both_compress_and_decompress() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    write_pgm(&pgm_in, 2, &[1, 2, 3, 4])?;

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-u")
        .arg("-i")
        .arg(&pgm_in)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn rejects_nonexistent_input() -> STDRESULT {
    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg("does-not-exist.pgm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
    Ok(())
}

#[test]
fn rejects_non_positive_alpha() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let pgm_in = temp_dir.path().join("in.pgm");
    write_pgm(&pgm_in, 2, &[1, 2, 3, 4])?;

    Command::cargo_bin("qtc")?
        .arg("-c")
        .arg("-i")
        .arg(&pgm_in)
        .arg("-a")
        .arg("0")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn decode_rejects_corrupted_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let bad_in = temp_dir.path().join("bad.qtc");
    std::fs::write(&bad_in, b"not a qtc file")?;
    let pgm_out = temp_dir.path().join("out.pgm");

    Command::cargo_bin("qtc")?
        .arg("-u")
        .arg("-i")
        .arg(&bad_in)
        .arg("-o")
        .arg(&pgm_out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
    Ok(())
}
