//! Example content for empty feeds.
//!
//! Seeded items start at zero votes like any other item; the ledger is the
//! only writer of counters.

use hum_core::{
  item::{ItemKind, NewItem},
  store::CommunityStore,
};

/// `(title, content, category)`
pub const EXAMPLE_POSTS: &[(&str, &str, &str)] = &[
  (
    "White Noise Machines for Tinnitus",
    "I've found that a white noise machine helps mask my tinnitus at night. \
     Three months in, my sleep is much better. Anyone else tried this?",
    "Tips",
  ),
  (
    "Audiologist Recommended Hearing Aids",
    "My audiologist suggested hearing aids with tinnitus masking features. \
     They're expensive, so has anyone had success with them?",
    "Questions",
  ),
  (
    "Meditation for Tinnitus Relief",
    "After three weeks of morning and evening meditation I notice I focus \
     less on the ringing. Highly recommend trying mindfulness.",
    "Experiences",
  ),
  (
    "Dietary Triggers for Tinnitus",
    "Does anyone's tinnitus get louder with certain foods or drinks? Coffee, \
     alcohol and salty food all seem to trigger spikes for me.",
    "Questions",
  ),
  (
    "Notch Therapy Research",
    "Notch therapy removes your tinnitus frequency from the music you listen \
     to. The research looks promising; any real-world results?",
    "Research",
  ),
];

/// `(title, content, category, authors, source_url)`
pub const EXAMPLE_ARTICLES: &[(&str, &str, &str, &str, &str)] = &[
  (
    "Cognitive Behavioral Therapy for Tinnitus: A Comprehensive Review",
    "Randomized controlled trials show CBT significantly reduces tinnitus \
     distress and improves quality of life, across face-to-face, group and \
     internet-based delivery.",
    "Treatment",
    "Schmidt JF, Kamalski DM, Prescott CA",
    "https://doi.org/10.1001/jamaoto.2019.1728",
  ),
  (
    "Neural Mechanisms of Tinnitus: Insights from Neuroimaging Studies",
    "fMRI and PET findings point to maladaptive plasticity across auditory, \
     limbic and prefrontal regions.",
    "Neuroscience",
    "Roberts LE, Eggermont JJ, Caspary DM, Shore SE",
    "https://doi.org/10.1016/j.heares.2020.107881",
  ),
  (
    "Bimodal Neuromodulation for Tinnitus Treatment: Clinical Trial Results",
    "Pairing sound with trigeminal stimulation improved symptoms for most \
     participants after 12 weeks, with effects lasting up to a year.",
    "Clinical Trial",
    "Conlon B, Hamilton C, Hughes S, Meade E, Hall DA, Vanneste S",
    "https://doi.org/10.1126/scitranslmed.abb2830",
  ),
  (
    "Noise-Induced Hidden Hearing Loss and Tinnitus: Molecular Mechanisms",
    "Glutamate receptor pathways drive cochlear synaptopathy after noise \
     exposure, a likely precursor to tinnitus.",
    "Molecular Biology",
    "Kujawa SG, Liberman MC, Wan G",
    "https://doi.org/10.1523/JNEUROSCI.2845-19.2020",
  ),
  (
    "Sound Therapy for Tinnitus: A Systematic Review and Meta-Analysis",
    "Across 21 trials, sound therapy shows moderate benefit, strongest when \
     combined with counselling.",
    "Treatment",
    "Sereda M, Xia J, El Refaie A, Hall DA, Hoare DJ",
    "https://doi.org/10.1177/0003489419836226",
  ),
];

/// How many items [`seed_examples`] inserted per kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
  pub posts:    usize,
  pub articles: usize,
}

/// Fill each empty feed with its examples. Feeds that already hold items are
/// left alone, so this is safe to run on every start.
pub async fn seed_examples<S>(store: &S) -> Result<SeedReport, S::Error>
where
  S: CommunityStore,
{
  let mut report = SeedReport::default();

  if store.count_items(ItemKind::Post).await? == 0 {
    for (title, content, category) in EXAMPLE_POSTS {
      store
        .create_item(NewItem::post(None, *title, *content, *category))
        .await?;
      report.posts += 1;
    }
  }

  if store.count_items(ItemKind::Article).await? == 0 {
    for (title, content, category, authors, source_url) in EXAMPLE_ARTICLES {
      store
        .create_item(NewItem::article(
          *title,
          *content,
          *category,
          *authors,
          Some((*source_url).to_owned()),
        ))
        .await?;
      report.articles += 1;
    }
  }

  tracing::info!(posts = report.posts, articles = report.articles, "seeded example content");
  Ok(report)
}
