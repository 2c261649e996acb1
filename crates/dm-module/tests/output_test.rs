//! Output product assembly, serialization and input resolution from files

mod common;

use dm_module::{DmInput, Error, HeaderConfig, OutputAssembler};
use dm_xml::XmlParser;
use std::fs;

#[test]
fn serialized_product_parses_back_with_same_container() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.xml");

    OutputAssembler::default()
        .assemble("X.fits")
        .serialize(&path)?;

    let document = XmlParser::parse_file(&path)?;
    let container = document
        .cursor()
        .navigate("Data/NoisyConvergence/DataContainer")?;
    assert_eq!(container.get_string("FileName")?, "X.fits");
    assert_eq!(container.node().attribute("filestatus"), Some("PROPOSED"));
    assert_eq!(
        document.metadata.namespace.as_deref(),
        Some("http://euclid.esa.org/schema/dpd/le3/wl/twodmass/out/convergencepatch")
    );
    Ok(())
}

#[test]
fn directory_components_are_dropped_from_the_filename() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.xml");

    for (given, stored) in [
        ("/a/b/map.fits", "map.fits"),
        ("data/DevWS_ShearMap.fits", "DevWS_ShearMap.fits"),
        ("plain.fits", "plain.fits"),
    ] {
        let product = OutputAssembler::default().assemble(given);
        assert_eq!(product.file_name(), stored);

        product.serialize(&path)?;
        let reparsed = XmlParser::parse_file(&path)?;
        assert_eq!(
            reparsed
                .cursor()
                .get_string("Data/NoisyConvergence/DataContainer/FileName")?,
            stored
        );
    }
    Ok(())
}

#[test]
fn header_tags_come_from_configuration() -> anyhow::Result<()> {
    let header = HeaderConfig {
        curator: "SDC-IT".to_string(),
        ..HeaderConfig::default()
    };
    let product = OutputAssembler::new(header).assemble("map.fits");

    let cursor = product.document().cursor();
    assert_eq!(cursor.get_string("Header/Curator")?, "SDC-IT");
    assert_eq!(cursor.get_string("Header/ProdSDC")?, "SDC-FR");
    Ok(())
}

#[test]
fn unwritable_destination_is_an_io_error_and_leaves_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing").join("out.xml");

    let err = OutputAssembler::default()
        .assemble("map.fits")
        .serialize(&path)
        .unwrap_err();

    assert!(matches!(err, Error::Io { .. }), "{err}");
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn input_product_file_resolves_catalog() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("in.xml");
    fs::write(&path, common::INPUT_PRODUCT)?;

    let input = DmInput::read_file(&path)?;
    assert_eq!(input.fits_catalog_filename(), "EUC_LE3_WL_LensMC_Catalog.fits");
    Ok(())
}

#[test]
fn malformed_input_product_is_a_parse_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("in.xml");
    fs::write(&path, "<DpdTwoDMassLensMCCatalog><Data></Catalog>")?;

    let err = DmInput::read_file(&path).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{err}");
    Ok(())
}
