use crate::key_signature::{signature_for, AccidentalType, Key, KeySignature};
use crate::pitch::{octave_of, Accidental, NoteName};
use crate::resolver::ChordDefinition;

/// Divisions per quarter note; a whole note is 4 quarters
const DIVISIONS: u32 = 1;
const WHOLE_NOTE: u32 = 4 * DIVISIONS;

/// Render a resolved chord as a one-measure MusicXML score: treble clef, the
/// root's major key signature and the chord as a single whole-note stack.
pub fn chord_to_musicxml(chord: &ChordDefinition) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');
    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    xml.push_str("  <work>\n");
    xml.push_str(&format!(
        "    <work-title>{} {}</work-title>\n",
        escape_xml(chord.root.as_str()),
        escape_xml(chord.quality.name())
    ));
    xml.push_str("  </work>\n");

    xml.push_str("  <part-list>\n");
    xml.push_str("    <score-part id=\"P1\">\n");
    xml.push_str(&format!(
        "      <part-name>{}</part-name>\n",
        escape_xml(&chord.notation)
    ));
    xml.push_str("    </score-part>\n");
    xml.push_str("  </part-list>\n");

    xml.push_str("  <part id=\"P1\">\n");
    xml.push_str("    <measure number=\"1\">\n");
    xml.push_str(&attributes_to_xml(chord));
    xml.push_str(&harmony_to_xml(chord));

    let signature = signature_for(Key::major(chord.root));
    for (i, (name, midi)) in chord.spelled().enumerate() {
        xml.push_str("      <note>\n");
        // Every note after the first stacks onto the same beat
        if i > 0 {
            xml.push_str("        <chord/>\n");
        }
        xml.push_str("        <pitch>\n");
        xml.push_str(&format!("          <step>{}</step>\n", name.letter()));
        match name.accidental() {
            Accidental::Sharp => xml.push_str("          <alter>1</alter>\n"),
            Accidental::Flat => xml.push_str("          <alter>-1</alter>\n"),
            Accidental::Natural => {}
        }
        xml.push_str(&format!("          <octave>{}</octave>\n", octave_of(midi)));
        xml.push_str("        </pitch>\n");
        xml.push_str(&format!("        <duration>{}</duration>\n", WHOLE_NOTE));
        xml.push_str("        <type>whole</type>\n");
        if let Some(accidental) = displayed_accidental(name, &signature) {
            xml.push_str(&format!("        <accidental>{}</accidental>\n", accidental));
        }
        xml.push_str("      </note>\n");
    }

    xml.push_str("    </measure>\n");
    xml.push_str("  </part>\n");
    xml.push_str("</score-partwise>\n");

    xml
}

/// The accidental to print next to a note, or `None` when the key signature
/// already gives the letter that alteration
fn displayed_accidental(name: NoteName, signature: &KeySignature) -> Option<&'static str> {
    let from_key = if signature.altered_letters().contains(&name.letter()) {
        match signature.kind {
            AccidentalType::Sharp => Accidental::Sharp,
            AccidentalType::Flat => Accidental::Flat,
            AccidentalType::None => Accidental::Natural,
        }
    } else {
        Accidental::Natural
    };

    if name.accidental() == from_key {
        return None;
    }
    Some(match name.accidental() {
        Accidental::Sharp => "sharp",
        Accidental::Flat => "flat",
        Accidental::Natural => "natural",
    })
}

fn attributes_to_xml(chord: &ChordDefinition) -> String {
    let signature = signature_for(Key::major(chord.root));
    let mut xml = String::new();

    xml.push_str("      <attributes>\n");
    xml.push_str(&format!("        <divisions>{}</divisions>\n", DIVISIONS));
    xml.push_str("        <key>\n");
    xml.push_str(&format!("          <fifths>{}</fifths>\n", signature.fifths()));
    xml.push_str("          <mode>major</mode>\n");
    xml.push_str("        </key>\n");
    xml.push_str("        <time>\n");
    xml.push_str("          <beats>4</beats>\n");
    xml.push_str("          <beat-type>4</beat-type>\n");
    xml.push_str("        </time>\n");
    xml.push_str("        <clef>\n");
    xml.push_str("          <sign>G</sign>\n");
    xml.push_str("          <line>2</line>\n");
    xml.push_str("        </clef>\n");
    xml.push_str("      </attributes>\n");
    xml
}

/// Chord symbol above the staff
fn harmony_to_xml(chord: &ChordDefinition) -> String {
    let mut xml = String::new();
    xml.push_str("      <harmony>\n");
    xml.push_str("        <root>\n");
    xml.push_str(&format!("          <root-step>{}</root-step>\n", chord.root.letter()));
    match chord.root.accidental() {
        Accidental::Sharp => xml.push_str("          <root-alter>1</root-alter>\n"),
        Accidental::Flat => xml.push_str("          <root-alter>-1</root-alter>\n"),
        Accidental::Natural => {}
    }
    xml.push_str("        </root>\n");
    xml.push_str(&format!(
        "        <kind text=\"{}\">{}</kind>\n",
        escape_xml(chord.quality.symbol()),
        harmony_kind(chord)
    ));
    xml.push_str("      </harmony>\n");
    xml
}

fn harmony_kind(chord: &ChordDefinition) -> &'static str {
    use crate::chord::ChordQuality;
    match chord.quality {
        ChordQuality::Major => "major",
        ChordQuality::Minor => "minor",
        ChordQuality::Diminished => "diminished",
        ChordQuality::Augmented => "augmented",
        ChordQuality::Dominant7 => "dominant",
        ChordQuality::Major7 => "major-seventh",
        ChordQuality::Minor7 => "minor-seventh",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
