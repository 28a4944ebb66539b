//! The dashboard page, embedded so the binary is self-contained.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Map Layer Dashboard</title>
  <link
    rel="stylesheet"
    href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
    integrity="sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY="
    crossorigin=""
  />
  <style>
    html, body { height: 100%; margin: 0; padding: 0; font-family: sans-serif; }
    #app { display: flex; height: 100%; }
    #sidebar {
      width: 280px;
      padding: 12px;
      box-sizing: border-box;
      overflow-y: auto;
      background: #f7f7f7;
      border-right: 1px solid #ccc;
    }
    #sidebar h1 { font-size: 18px; margin: 0 0 12px 0; }
    #sidebar h2 { font-size: 14px; margin: 16px 0 6px 0; }
    #map { flex: 1; height: 100%; }
    #layerSelect { width: 100%; min-height: 120px; }
    #datasetList { margin: 4px 0; padding-left: 18px; font-size: 13px; }
    .error {
      background: #fdecea;
      border: 1px solid #e57373;
      color: #b71c1c;
      padding: 6px 8px;
      margin: 6px 0;
      font-size: 13px;
      border-radius: 3px;
    }
    #warning {
      display: none;
      background: #fff8e1;
      border: 1px solid #ffb300;
      color: #8d6e00;
      padding: 6px 8px;
      margin: 6px 0;
      font-size: 13px;
      border-radius: 3px;
    }
  </style>
</head>
<body>
  <div id="app">
    <div id="sidebar">
      <h1>Interactive Map Dashboard</h1>
      <input type="file" id="fileInput" multiple accept=".csv" />
      <div id="errors"></div>
      <div id="warning">No valid data was loaded. Check the CSV files.</div>
      <h2>Layers to display</h2>
      <select id="layerSelect" multiple></select>
      <h2>Loaded datasets</h2>
      <ul id="datasetList"></ul>
    </div>
    <div id="map"></div>
  </div>

  <script
    src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
    integrity="sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo="
    crossorigin=""
  ></script>

  <script>
    const fileInput = document.getElementById('fileInput');
    const layerSelect = document.getElementById('layerSelect');
    const datasetList = document.getElementById('datasetList');
    const errorsDiv = document.getElementById('errors');
    const warningDiv = document.getElementById('warning');

    const map = L.map('map').setView([-15, -55], 4);
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
      maxZoom: 19,
      attribution: '&copy; OpenStreetMap contributors',
    }).addTo(map);

    let overlays = [];
    let layerControl = null;

    async function refresh() {
      const selected = Array.from(layerSelect.selectedOptions).map(o => o.value);

      const form = new FormData();
      for (const file of fileInput.files) {
        form.append('file', file, file.name);
      }
      form.append('layers', JSON.stringify(selected));

      let data;
      try {
        const resp = await fetch('/api/render', { method: 'POST', body: form });
        if (!resp.ok) {
          showErrors([{ file: '(request)', message: await resp.text() }]);
          return;
        }
        data = await resp.json();
      } catch (err) {
        showErrors([{ file: '(request)', message: String(err) }]);
        return;
      }

      showErrors(data.issues);
      warningDiv.style.display = data.empty_warning ? 'block' : 'none';

      // Rebuild the multiselect; selections for vanished datasets just drop.
      layerSelect.innerHTML = '';
      for (const ds of data.datasets) {
        const opt = document.createElement('option');
        opt.value = ds.name;
        opt.textContent = ds.name;
        opt.selected = selected.includes(ds.name);
        layerSelect.appendChild(opt);
      }

      datasetList.innerHTML = '';
      for (const ds of data.datasets) {
        const li = document.createElement('li');
        li.textContent = ds.skipped_rows > 0
          ? `${ds.name} (${ds.records} rows, ${ds.skipped_rows} dropped)`
          : `${ds.name} (${ds.records} rows)`;
        datasetList.appendChild(li);
      }

      for (const overlay of overlays) {
        map.removeLayer(overlay.layer);
      }
      overlays = [];
      if (layerControl) {
        map.removeControl(layerControl);
        layerControl = null;
      }

      if (!data.map) {
        return;
      }

      map.setView(data.map.center, data.map.zoom);

      for (const layer of data.map.layers) {
        const geoLayer = L.geoJSON(layer.features, {
          style: {
            fillColor: layer.color,
            color: data.map.outline_color,
            weight: data.map.outline_weight,
            fillOpacity: data.map.fill_opacity,
          },
          onEachFeature: (feature, l) => {
            const props = feature.properties || {};
            const rows = layer.tooltip_fields.map(
              f => `<b>${f}</b>: ${props[f] ?? ''}`
            );
            if (rows.length) {
              l.bindTooltip(rows.join('<br>'), { sticky: true });
            }
          },
        }).addTo(map);
        overlays.push({ name: layer.name, layer: geoLayer });
      }

      if (overlays.length) {
        const controlLayers = {};
        for (const o of overlays) {
          controlLayers[o.name] = o.layer;
        }
        layerControl = L.control.layers(null, controlLayers).addTo(map);
      }
    }

    function showErrors(issues) {
      errorsDiv.innerHTML = '';
      for (const issue of issues) {
        const div = document.createElement('div');
        div.className = 'error';
        div.textContent = `Error loading ${issue.file}: ${issue.message}`;
        errorsDiv.appendChild(div);
      }
    }

    fileInput.addEventListener('change', refresh);
    layerSelect.addEventListener('change', refresh);
  </script>
</body>
</html>
"#;
