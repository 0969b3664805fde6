use crate::util::Kaomoji;
use ap_signature::header;

pub fn do_it(header: String) -> miette::Result<()> {
    let params = match header::parse(&header) {
        Ok(params) => params,
        Err(err) => return Err(miette::Report::new(err).with_source_code(header)),
    };

    for (name, value) in params.iter() {
        println!("{name}: {value}");
    }

    let missing = ["keyId", "algorithm", "signature"]
        .into_iter()
        .filter(|name| params.get(name).is_none())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        miette::bail!(
            "Header is missing the parameters {} {}",
            missing.join(", "),
            Kaomoji::Failure
        );
    }

    println!("✅ Header is valid! {}", Kaomoji::Success);

    Ok(())
}
