use std::io::Write;

use dlgs::io::reader::SampleReader;
use dlgs::io::writer::{SampleWriter, WriterTrait};
use dlgs::sample::{ContextResponse, DomainDialogue, Sample};

fn samples(nb: usize) -> Vec<Sample> {
    (0..nb)
        .map(|x| {
            if x % 2 == 0 {
                Sample::ContextResponse(ContextResponse {
                    context: (0..=x % 5).map(|t| format!("turn number {t}")).collect(),
                    response: format!("response number {x}"),
                })
            } else {
                Sample::Domain(DomainDialogue {
                    domain: "askreddit".to_string(),
                    turns_with_ids: vec![
                        (format!("p{x}"), "a question".to_string()),
                        (format!("c{x}"), "an answer".to_string()),
                    ],
                })
            }
        })
        .collect()
}

#[test]
fn write_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("DLGS_2022_05.zst");

    let mut writer = SampleWriter::create(&dst, 7).unwrap();
    writer.write(samples(100)).unwrap();
    assert_eq!(writer.count(), 100);
    writer.close().unwrap();

    let read: Vec<Sample> = SampleReader::from_path(&dst)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(read, samples(100));
}

#[test]
fn unicode_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("out.zst");
    let sample = Sample::ContextResponse(ContextResponse {
        context: vec!["Qu'est-ce que c'est ? \"ça\"".to_string()],
        response: "日本語 も 大丈夫".to_string(),
    });

    let mut writer = SampleWriter::create(&dst, 1).unwrap();
    writer.write_single(&sample).unwrap();
    writer.close().unwrap();

    let mut read = SampleReader::from_path(&dst).unwrap();
    assert_eq!(read.next().unwrap().unwrap(), sample);
    assert!(read.next().is_none());
}

#[test]
fn concatenated_outputs_read_as_one() {
    // two runs appended to the same file produce two zstd frames
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("out.zst");
    let mut bytes = Vec::new();
    for chunk in [samples(3), samples(2)] {
        let mut writer = SampleWriter::new(Vec::new(), 1024).unwrap();
        writer.write(chunk).unwrap();
        bytes.extend(writer.finish().unwrap());
    }
    std::fs::File::create(&dst)
        .unwrap()
        .write_all(&bytes)
        .unwrap();

    let read: Vec<Sample> = SampleReader::from_path(&dst)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(read.len(), 5);
}
